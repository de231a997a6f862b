use crate::model::Location;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DENTISTS_JSON: &str = include_str!("../assets/dentists.json");

/// A known practitioner. Used for lookup and inference only; never
/// mutated by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DentistRecord {
    pub id: String,
    pub name: String,
    pub photo: PathBuf,
    pub locations: Vec<Location>,
}

impl DentistRecord {
    /// The practitioner's only eligible location, if there is exactly one.
    pub fn sole_location(&self) -> Option<Location> {
        match self.locations.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DentistDirectory {
    records: Vec<DentistRecord>,
}

impl DentistDirectory {
    /// The directory shipped with this build.
    pub fn builtin() -> DentistDirectory {
        let records: Vec<DentistRecord> =
            serde_json::from_str(DENTISTS_JSON).unwrap_or_default();
        DentistDirectory { records }
    }

    pub fn from_records(records: Vec<DentistRecord>) -> DentistDirectory {
        DentistDirectory { records }
    }

    pub fn records(&self) -> &[DentistRecord] {
        &self.records
    }

    /// Look up a practitioner by name, tolerating an honorific prefix.
    ///
    /// Exact match on the honorific-stripped name wins; otherwise the
    /// first record whose full name contains the search term.
    pub fn find_by_name(&self, name: &str) -> Option<&DentistRecord> {
        let needle = strip_honorific(name);
        if needle.is_empty() {
            return None;
        }

        self.records
            .iter()
            .find(|d| strip_honorific(&d.name) == needle)
            .or_else(|| {
                self.records
                    .iter()
                    .find(|d| d.name.to_lowercase().contains(&needle))
            })
    }
}

fn strip_honorific(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let stripped = lower
        .strip_prefix("dr.")
        .or_else(|| lower.strip_prefix("dr "))
        .unwrap_or(&lower);
    stripped.trim().to_string()
}
