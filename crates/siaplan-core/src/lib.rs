pub mod directory;
pub mod edit;
pub mod error;
pub mod extraction;
pub mod layout;
pub mod model;
pub mod parse;
pub mod render;
pub mod schedule;
pub mod settings;

use directory::DentistDirectory;
use error::PlanError;
use extraction::PdfTextSource;
use layout::font::FontSet;
use model::TreatmentPlan;
use parse::ParseOutcome;
use settings::TemplateSettings;

/// Forward path: lay out a treatment plan and render it to PDF bytes.
///
/// Loads the configured font (falling back to the built-in face), maps
/// the plan onto pages, then renders. Missing template or team art is a
/// hard failure; a failing doctor photo is skipped.
pub fn generate_pdf(
    plan: &TreatmentPlan,
    settings: &TemplateSettings,
) -> Result<Vec<u8>, PlanError> {
    let fonts = FontSet::load(settings.font.as_deref());
    let layout = layout::layout_document(plan, settings, &fonts)?;
    render::render_pdf(&layout, &fonts)
}

/// Reverse path: recover structured fields from a rendered document.
///
/// The document need not have been produced by [`generate_pdf`]; the
/// heuristics are pattern-based so legacy documents of the same family
/// parse too. Hard failures are limited to non-PDF input and documents
/// with no extractable text; everything else degrades to warnings.
pub fn parse_pdf(
    pdf_bytes: &[u8],
    source: &dyn PdfTextSource,
    directory: &DentistDirectory,
) -> Result<ParseOutcome, PlanError> {
    parse::parse_pdf(pdf_bytes, source, directory)
}
