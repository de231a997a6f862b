use crate::error::PlanError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const DEFAULT_SCHEDULE_JSON: &str = include_str!("../assets/fee-schedule.json");

/// One reference billing code with its default description and unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeScheduleEntry {
    pub code: String,
    pub description: String,
    pub fee: Decimal,
}

/// The versioned reference table of billing codes.
///
/// The version marker distinguishes an outdated user-local copy from a
/// fresh install; it triggers an update notification, never a silent
/// overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub version: String,
    pub entries: Vec<FeeScheduleEntry>,
}

impl FeeSchedule {
    /// The schedule shipped with this build.
    pub fn builtin() -> FeeSchedule {
        // The embedded default is validated by tests; a parse failure here
        // is a build defect, not a runtime condition.
        serde_json::from_str(DEFAULT_SCHEDULE_JSON)
            .unwrap_or_else(|_| FeeSchedule {
                version: String::new(),
                entries: Vec::new(),
            })
    }

    pub fn find_by_code(&self, code: &str) -> Option<&FeeScheduleEntry> {
        let code = code.trim();
        self.entries.iter().find(|e| e.code == code)
    }
}

/// How a stored schedule copy relates to the shipped default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStatus {
    /// No stored copy: fresh install.
    Fresh,
    /// Stored copy carries the shipped version.
    Current,
    /// Stored copy predates the shipped default.
    UpdateAvailable,
}

pub fn schedule_status(stored_version: Option<&str>) -> ScheduleStatus {
    match stored_version {
        None => ScheduleStatus::Fresh,
        Some(v) if v == FeeSchedule::builtin().version => ScheduleStatus::Current,
        Some(_) => ScheduleStatus::UpdateAvailable,
    }
}

/// Parse a fee schedule from a JSON string.
pub fn parse_schedule_str(json: &str) -> Result<FeeSchedule, PlanError> {
    let schedule: FeeSchedule = serde_json::from_str(json).map_err(PlanError::Json)?;
    validate_schedule(&schedule)?;
    Ok(schedule)
}

/// Validate that a fee schedule is well-formed.
pub fn validate_schedule(schedule: &FeeSchedule) -> Result<(), PlanError> {
    if schedule.version.trim().is_empty() {
        return Err(PlanError::ScheduleInvalid(
            "version marker must not be empty".into(),
        ));
    }

    if schedule.entries.is_empty() {
        return Err(PlanError::ScheduleInvalid(
            "entries must not be empty".into(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for entry in &schedule.entries {
        if entry.code.trim().is_empty() {
            return Err(PlanError::ScheduleInvalid(
                "item code must not be empty".into(),
            ));
        }
        if !seen.insert(entry.code.as_str()) {
            return Err(PlanError::ScheduleInvalid(format!(
                "duplicate item code '{}'",
                entry.code
            )));
        }
        if entry.fee < Decimal::ZERO {
            return Err(PlanError::ScheduleInvalid(format!(
                "item code '{}' has a negative fee",
                entry.code
            )));
        }
    }

    Ok(())
}
