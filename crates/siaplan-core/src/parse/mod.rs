pub mod fields;
pub mod items;

use crate::directory::DentistDirectory;
use crate::error::PlanError;
use crate::extraction::lines::{reconstruct_lines, DEFAULT_LINE_TOLERANCE};
use crate::extraction::PdfTextSource;
use crate::model::{Location, TreatmentItem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Best-effort fields recovered from a rendered document. Every field
/// is independently optional; absences surface as warnings, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPlan {
    pub patient_name: String,
    pub doctor_name: String,
    #[serde(default)]
    pub doctor_photo: Option<PathBuf>,
    pub location: Option<Location>,
    pub date: NaiveDate,
    pub items: Vec<TreatmentItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub plan: ParsedPlan,
    pub warnings: Vec<String>,
}

/// Parse a rendered treatment-plan PDF back into structured fields.
///
/// Hard failures are limited to non-PDF input and documents yielding no
/// extractable text; everything else degrades to warnings so the caller
/// can import whatever was recovered.
pub fn parse_pdf(
    pdf_bytes: &[u8],
    source: &dyn PdfTextSource,
    directory: &DentistDirectory,
) -> Result<ParseOutcome, PlanError> {
    if !pdf_bytes.starts_with(b"%PDF") {
        return Err(PlanError::InvalidInput(
            "please provide a valid PDF file".into(),
        ));
    }

    let pages = source.extract_runs(pdf_bytes)?;
    let lines = reconstruct_lines(&pages, DEFAULT_LINE_TOLERANCE);
    tracing::debug!(
        backend = source.backend_name(),
        pages = pages.len(),
        lines = lines.len(),
        "extracted document text"
    );

    if lines.is_empty() {
        return Err(PlanError::EmptyDocument);
    }

    Ok(parse_lines(&lines, directory))
}

/// Field recovery over a reconstructed line sequence. Each field is an
/// independent scan; the order of patient-name passes is the documented
/// disambiguation contract.
pub fn parse_lines(lines: &[String], directory: &DentistDirectory) -> ParseOutcome {
    let mut location = fields::parse_location(lines);
    let doctor_line = fields::doctor_line(lines);
    let doctor_name = fields::parse_doctor_name(lines);
    let patient_name = fields::parse_patient_name(lines, doctor_line);
    let date = fields::parse_date(lines)
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let items = items::parse_items(lines);

    // Directory cross-validation: a known practitioner contributes a
    // photo, and an unambiguous home clinic fills a missing location.
    let mut doctor_photo = None;
    if !doctor_name.is_empty() {
        if let Some(record) = directory.find_by_name(&doctor_name) {
            doctor_photo = Some(record.photo.clone());
            if location.is_none() {
                location = record.sole_location();
            }
        }
    }

    let mut warnings = Vec::new();
    if location.is_none() {
        warnings.push("Could not detect clinic location. Please select manually.".to_string());
    }
    if doctor_name.is_empty() {
        warnings.push("Could not detect doctor name. Please enter manually.".to_string());
    }
    if patient_name.is_empty() {
        warnings.push("Could not detect patient name. Please enter manually.".to_string());
    }
    if items.is_empty() {
        warnings.push("No treatment items found. You may need to add them manually.".to_string());
    }

    ParseOutcome {
        plan: ParsedPlan {
            patient_name,
            doctor_name,
            doctor_photo,
            location,
            date,
            items,
        },
        warnings,
    }
}
