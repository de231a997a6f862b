use crate::error::PlanError;
use crate::model::Team;
use crate::schedule::{
    parse_schedule_str, schedule_status, validate_schedule, FeeSchedule, ScheduleStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Logical page size, in points (11.25in x 20in at 72 pt/inch). All
/// template coordinates live in this space with a bottom-left origin;
/// rendering surfaces scale it uniformly.
pub const PAGE_WIDTH: f32 = 810.0;
pub const PAGE_HEIGHT: f32 = 1440.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotoFrame {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Layout geometry and template art for document generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Background art, full-page raster images. A missing option means a
    /// plain page; a configured but unreadable path aborts generation.
    pub cover_background: Option<PathBuf>,
    pub table_background: Option<PathBuf>,
    pub table_continuation_background: Option<PathBuf>,
    /// Closing team page art per team. Generation fails if the plan's
    /// team has no entry here.
    pub team_pages: BTreeMap<Team, PathBuf>,
    /// Optional TTF used for text and width measurement; absent or
    /// unreadable falls back to the built-in face.
    pub font: Option<PathBuf>,

    pub patient_name_position: Position,
    pub patient_name_font_size: f32,
    pub doctor_name_position: Position,
    pub doctor_name_font_size: f32,
    pub doctor_photo_frame: PhotoFrame,

    pub table_start_y: f32,
    pub table_margin_x: f32,
    pub row_height: f32,
    pub max_rows_per_page: usize,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        TemplateSettings {
            cover_background: None,
            table_background: None,
            table_continuation_background: None,
            team_pages: BTreeMap::new(),
            font: None,
            patient_name_position: Position { x: 405.0, y: 460.0 },
            patient_name_font_size: 40.0,
            doctor_name_position: Position { x: 120.0, y: 210.0 },
            doctor_name_font_size: 28.0,
            doctor_photo_frame: PhotoFrame {
                x: 325.0,
                y: 260.0,
                size: 160.0,
            },
            table_start_y: 1180.0,
            table_margin_x: 60.0,
            row_height: 90.0,
            max_rows_per_page: 5,
        }
    }
}

/// Key-value persistence for user preferences. Read at startup, written
/// only on explicit user action; injected rather than reached for.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, PlanError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PlanError>;
    fn remove(&mut self, key: &str) -> Result<(), PlanError>;
}

pub const TEMPLATE_SETTINGS_KEY: &str = "template-settings";
pub const FEE_SCHEDULE_KEY: &str = "fee-schedule";
pub const FEE_SCHEDULE_VERSION_KEY: &str = "fee-schedule-version";

/// Store backed by a single JSON object file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Default location under the user's configuration directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("siaplan")
            .join("settings.json")
    }

    pub fn open(path: &Path) -> Result<JsonFileStore, PlanError> {
        let values = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| PlanError::SettingsLoad {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            serde_json::from_str(&content).map_err(|e| PlanError::SettingsLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            BTreeMap::new()
        };
        Ok(JsonFileStore {
            path: path.to_path_buf(),
            values,
        })
    }

    fn flush(&self) -> Result<(), PlanError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PlanError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PlanError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), PlanError> {
        self.values.remove(key);
        self.flush()
    }
}

/// In-memory store for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PlanError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PlanError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PlanError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Load template settings, falling back to the shipped defaults when the
/// store has none.
pub fn load_template_settings(store: &dyn SettingsStore) -> Result<TemplateSettings, PlanError> {
    match store.get(TEMPLATE_SETTINGS_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(TemplateSettings::default()),
    }
}

pub fn save_template_settings(
    store: &mut dyn SettingsStore,
    settings: &TemplateSettings,
) -> Result<(), PlanError> {
    let json = serde_json::to_string(settings)?;
    store.set(TEMPLATE_SETTINGS_KEY, &json)
}

pub fn reset_template_settings(store: &mut dyn SettingsStore) -> Result<(), PlanError> {
    store.remove(TEMPLATE_SETTINGS_KEY)
}

/// Load the fee schedule, preferring a stored user copy over the shipped
/// default, and report how the stored copy relates to the default.
pub fn load_fee_schedule(
    store: &dyn SettingsStore,
) -> Result<(FeeSchedule, ScheduleStatus), PlanError> {
    let stored_version = store.get(FEE_SCHEDULE_VERSION_KEY)?;
    let status = schedule_status(stored_version.as_deref());
    let schedule = match store.get(FEE_SCHEDULE_KEY)? {
        Some(json) => parse_schedule_str(&json)?,
        None => FeeSchedule::builtin(),
    };
    Ok((schedule, status))
}

pub fn save_fee_schedule(
    store: &mut dyn SettingsStore,
    schedule: &FeeSchedule,
) -> Result<(), PlanError> {
    validate_schedule(schedule)?;
    let json = serde_json::to_string(schedule)?;
    store.set(FEE_SCHEDULE_KEY, &json)?;
    store.set(FEE_SCHEDULE_VERSION_KEY, &schedule.version)
}

/// Replace the stored copy with the shipped default and update the
/// stored version marker.
pub fn reset_fee_schedule(store: &mut dyn SettingsStore) -> Result<FeeSchedule, PlanError> {
    let schedule = FeeSchedule::builtin();
    save_fee_schedule(store, &schedule)?;
    Ok(schedule)
}
