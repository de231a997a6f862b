use siaplan_core::error::PlanError;
use siaplan_core::model::TreatmentPlan;
use siaplan_core::settings::{load_template_settings, JsonFileStore, TemplateSettings};
use std::path::PathBuf;

pub fn run(
    plan_file: PathBuf,
    settings_file: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<(), PlanError> {
    let plan_json = std::fs::read_to_string(&plan_file)?;
    let plan: TreatmentPlan = serde_json::from_str(&plan_json)?;

    let settings: TemplateSettings = match settings_file {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        }
        None => {
            let store = JsonFileStore::open(&JsonFileStore::default_path())?;
            load_template_settings(&store)?
        }
    };

    let bytes = siaplan_core::generate_pdf(&plan, &settings)?;

    let out_path = out.unwrap_or_else(|| default_filename(&plan));
    std::fs::write(&out_path, &bytes)?;
    eprintln!(
        "Generated {} ({} items, total {})",
        out_path.display(),
        plan.visible_items().len(),
        siaplan_core::layout::format_currency(plan.total_amount())
    );

    Ok(())
}

/// TreatmentPlan_<patient>_<yyyymmdd>.pdf, non-alphanumerics collapsed.
fn default_filename(plan: &TreatmentPlan) -> PathBuf {
    let sanitized: String = plan
        .patient_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let name = if sanitized.trim_matches('_').is_empty() {
        "Patient".to_string()
    } else {
        sanitized
    };
    PathBuf::from(format!(
        "TreatmentPlan_{}_{}.pdf",
        name,
        plan.date.format("%Y%m%d")
    ))
}
