use siaplan_core::error::PlanError;
use siaplan_core::settings::{
    load_template_settings, reset_template_settings, JsonFileStore,
};

fn open_store() -> Result<JsonFileStore, PlanError> {
    JsonFileStore::open(&JsonFileStore::default_path())
}

pub fn show() -> Result<(), PlanError> {
    let store = open_store()?;
    let settings = load_template_settings(&store)?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub fn reset() -> Result<(), PlanError> {
    let mut store = open_store()?;
    reset_template_settings(&mut store)?;
    println!("Template settings reset to defaults.");
    Ok(())
}
