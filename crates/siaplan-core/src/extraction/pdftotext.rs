use crate::error::PlanError;
use crate::extraction::{PageRuns, PdfTextSource, TextRun};
use std::io::Write;
use std::process::Command;

/// Positioned-text backend using `pdftotext -bbox` (poppler-utils).
///
/// The bbox output reports one element per word with its bounding box in
/// a top-left-origin page space; runs are converted to the bottom-left
/// origin the rest of the pipeline uses.
pub struct PdftotextSource;

impl PdftotextSource {
    pub fn new() -> Self {
        PdftotextSource
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfTextSource for PdftotextSource {
    fn extract_runs(&self, pdf_bytes: &[u8]) -> Result<Vec<PageRuns>, PlanError> {
        // Write PDF bytes to a temp file for the subprocess.
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| PlanError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| PlanError::Extraction(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-bbox")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PlanError::PdftotextNotFound
                } else {
                    PlanError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(PlanError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        Ok(parse_bbox_xml(&xml))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Parse `pdftotext -bbox` output into per-page positioned runs.
fn parse_bbox_xml(xml: &str) -> Vec<PageRuns> {
    let mut pages: Vec<PageRuns> = Vec::new();

    for raw in xml.lines() {
        let line = raw.trim();

        if line.starts_with("<page ") {
            let width = parse_attr_f32(line, "width").unwrap_or(0.0);
            let height = parse_attr_f32(line, "height").unwrap_or(0.0);
            pages.push(PageRuns {
                page_number: pages.len() + 1,
                width,
                height,
                runs: Vec::new(),
            });
            continue;
        }

        if line.starts_with("<word ") {
            let Some(page) = pages.last_mut() else {
                continue;
            };
            let (Some(x_min), Some(y_max)) =
                (parse_attr_f32(line, "xMin"), parse_attr_f32(line, "yMax"))
            else {
                continue;
            };
            if let Some(word_text) = parse_word_text(line) {
                let text = decode_xml_entities(&word_text).trim().to_string();
                if !text.is_empty() {
                    // Flip to bottom-left origin; yMax is the word's
                    // lowest edge in the top-origin space.
                    page.runs.push(TextRun {
                        x: x_min,
                        y: page.height - y_max,
                        text,
                    });
                }
            }
        }
    }

    pages
}

fn parse_attr_f32(tag: &str, name: &str) -> Option<f32> {
    parse_attr(tag, name)?.parse().ok()
}

fn parse_attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let rest = &tag[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

fn parse_word_text(word_tag: &str) -> Option<String> {
    let start = word_tag.find('>')? + 1;
    let end = word_tag.rfind("</word>")?;
    Some(word_tag[start..end].to_string())
}

fn decode_xml_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}
