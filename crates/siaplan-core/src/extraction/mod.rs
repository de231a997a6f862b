pub mod lines;
pub mod pdftotext;

use crate::error::PlanError;

/// One positioned text run on a page. Coordinates are logical points
/// with a bottom-left origin; `y` is the run's baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Positioned runs extracted from a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRuns {
    pub page_number: usize,
    pub width: f32,
    pub height: f32,
    pub runs: Vec<TextRun>,
}

/// Trait for positioned-text extraction backends.
pub trait PdfTextSource {
    /// Extract positioned text runs from PDF bytes, one PageRuns per page.
    fn extract_runs(&self, pdf_bytes: &[u8]) -> Result<Vec<PageRuns>, PlanError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
