use siaplan_core::directory::DentistDirectory;
use siaplan_core::error::PlanError;
use siaplan_core::extraction::pdftotext::PdftotextSource;
use std::path::PathBuf;

use crate::output;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), PlanError> {
    let pdf_bytes = std::fs::read(&input_file)?;
    let source = PdftotextSource::new();
    let directory = DentistDirectory::builtin();
    let outcome = siaplan_core::parse_pdf(&pdf_bytes, &source, &directory)?;

    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }

    match output_file {
        Some(path) => {
            // Always write JSON when saving to a file.
            let json = serde_json::to_string_pretty(&outcome.plan)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Recovered {} item(s), written to {}",
                outcome.plan.items.len(),
                path.display()
            );
        }
        None => {
            let text = match output_format {
                "json" => output::json::format_outcome(&outcome)?,
                _ => output::table::format_outcome(&outcome),
            };
            println!("{text}");
        }
    }

    Ok(())
}
