use siaplan_core::error::PlanError;
use siaplan_core::parse::ParseOutcome;

pub fn format_outcome(outcome: &ParseOutcome) -> Result<String, PlanError> {
    Ok(serde_json::to_string_pretty(outcome)?)
}
