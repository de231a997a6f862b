use siaplan_core::error::PlanError;
use siaplan_core::layout::format_currency;
use siaplan_core::schedule::ScheduleStatus;
use siaplan_core::settings::{load_fee_schedule, reset_fee_schedule, JsonFileStore};

fn open_store() -> Result<JsonFileStore, PlanError> {
    JsonFileStore::open(&JsonFileStore::default_path())
}

pub fn list() -> Result<(), PlanError> {
    let store = open_store()?;
    let (schedule, _) = load_fee_schedule(&store)?;

    println!("Fee schedule version {}\n", schedule.version);
    for entry in &schedule.entries {
        let short: String = entry.description.chars().take(60).collect();
        println!(
            "  {:<4} {:<62} {:>10}",
            entry.code,
            short,
            format_currency(entry.fee)
        );
    }
    Ok(())
}

pub fn status() -> Result<(), PlanError> {
    let store = open_store()?;
    let (schedule, status) = load_fee_schedule(&store)?;

    match status {
        ScheduleStatus::Fresh => {
            println!("No stored schedule; using the shipped default ({}).", schedule.version);
        }
        ScheduleStatus::Current => {
            println!("Stored schedule is current ({}).", schedule.version);
        }
        ScheduleStatus::UpdateAvailable => {
            println!(
                "Stored schedule ({}) is older than the shipped default. Run 'siaplan schedule reset' to update.",
                schedule.version
            );
        }
    }
    Ok(())
}

pub fn reset() -> Result<(), PlanError> {
    let mut store = open_store()?;
    let schedule = reset_fee_schedule(&mut store)?;
    println!(
        "Fee schedule reset to shipped version {} ({} entries).",
        schedule.version,
        schedule.entries.len()
    );
    Ok(())
}
