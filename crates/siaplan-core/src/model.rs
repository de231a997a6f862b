use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Clinic locations. Each maps to exactly one closing team page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Essendon,
    Burwood,
    Mulgrave,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Essendon => write!(f, "Essendon"),
            Location::Burwood => write!(f, "Burwood"),
            Location::Mulgrave => write!(f, "Mulgrave"),
        }
    }
}

impl Location {
    pub fn from_str_loose(s: &str) -> Option<Location> {
        let lower = s.trim().to_lowercase();
        if lower.contains("essendon") {
            Some(Location::Essendon)
        } else if lower.contains("burwood") {
            Some(Location::Burwood)
        } else if lower.contains("mulgrave") {
            Some(Location::Mulgrave)
        } else {
            None
        }
    }

    pub fn team(&self) -> Team {
        match self {
            Location::Essendon => Team::Essendon,
            Location::Burwood => Team::Burwood,
            Location::Mulgrave => Team::Mulgrave,
        }
    }

    pub const ALL: [Location; 3] = [Location::Essendon, Location::Burwood, Location::Mulgrave];
}

/// Team page identifier, one per clinic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Essendon,
    Burwood,
    Mulgrave,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Essendon => write!(f, "essendon"),
            Team::Burwood => write!(f, "burwood"),
            Team::Mulgrave => write!(f, "mulgrave"),
        }
    }
}

/// One quantity x unit-fee charge within a treatment item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEntry {
    pub id: Uuid,
    pub quantity: u32,
    pub unit_fee: Decimal,
}

impl FeeEntry {
    pub fn new(quantity: u32, unit_fee: Decimal) -> Self {
        FeeEntry {
            id: Uuid::new_v4(),
            quantity: quantity.max(1),
            unit_fee,
        }
    }

    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_fee
    }
}

/// One billable row of a treatment plan.
///
/// `item_code` is free text; the fee schedule auto-fills but never
/// constrains it. `fees` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentItem {
    pub id: Uuid,
    pub item_code: String,
    pub description: String,
    pub tooth: String,
    pub fees: Vec<FeeEntry>,
}

impl TreatmentItem {
    pub fn new() -> Self {
        TreatmentItem {
            id: Uuid::new_v4(),
            item_code: String::new(),
            description: String::new(),
            tooth: String::new(),
            fees: vec![FeeEntry::new(1, Decimal::ZERO)],
        }
    }

    pub fn total_fee(&self) -> Decimal {
        self.fees.iter().map(FeeEntry::line_total).sum()
    }

    /// Items with neither a code nor a description are never rendered.
    pub fn is_blank(&self) -> bool {
        self.item_code.trim().is_empty() && self.description.trim().is_empty()
    }

    pub fn add_fee_entry(&mut self) -> Uuid {
        let entry = FeeEntry::new(1, Decimal::ZERO);
        let id = entry.id;
        self.fees.push(entry);
        id
    }

    /// Removes a fee entry by id. Removing the last remaining entry is
    /// refused; the call is a no-op and returns false.
    pub fn remove_fee_entry(&mut self, id: Uuid) -> bool {
        if self.fees.len() <= 1 {
            return false;
        }
        let before = self.fees.len();
        self.fees.retain(|f| f.id != id);
        self.fees.len() < before
    }
}

impl Default for TreatmentItem {
    fn default() -> Self {
        Self::new()
    }
}

/// The root treatment-plan record, owned by the active editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    pub patient_name: String,
    pub doctor_name: String,
    #[serde(default)]
    pub doctor_photo: Option<PathBuf>,
    pub date: NaiveDate,
    pub location: Location,
    pub items: Vec<TreatmentItem>,
}

impl TreatmentPlan {
    pub fn new(date: NaiveDate, location: Location) -> Self {
        TreatmentPlan {
            patient_name: String::new(),
            doctor_name: String::new(),
            doctor_photo: None,
            date,
            location,
            items: vec![TreatmentItem::new()],
        }
    }

    /// Grand total, recomputed from the items on every call. Never cached.
    pub fn total_amount(&self) -> Decimal {
        self.items.iter().map(TreatmentItem::total_fee).sum()
    }

    /// Items that will actually be laid out.
    pub fn visible_items(&self) -> Vec<&TreatmentItem> {
        self.items.iter().filter(|i| !i.is_blank()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(code: &str, fees: Vec<(u32, Decimal)>) -> TreatmentItem {
        let mut it = TreatmentItem::new();
        it.item_code = code.to_string();
        it.fees = fees
            .into_iter()
            .map(|(q, f)| FeeEntry::new(q, f))
            .collect();
        it
    }

    fn plan_with(items: Vec<TreatmentItem>) -> TreatmentPlan {
        let mut plan = TreatmentPlan::new(
            NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            Location::Essendon,
        );
        plan.items = items;
        plan
    }

    #[test]
    fn test_total_amount_sums_fee_entries() {
        let plan = plan_with(vec![
            item("311", vec![(1, dec!(180))]),
            item("613", vec![(2, dec!(1750)), (1, dec!(100))]),
        ]);
        assert_eq!(plan.total_amount(), dec!(3780));
    }

    #[test]
    fn test_total_amount_idempotent() {
        let mut plan = plan_with(vec![item("311", vec![(1, dec!(180))])]);
        let first = plan.total_amount();
        assert_eq!(first, plan.total_amount());
        // Mutating an unrelated field never changes the total.
        plan.patient_name = "Mr John Citizen".into();
        assert_eq!(first, plan.total_amount());
    }

    #[test]
    fn test_remove_last_fee_entry_refused() {
        let mut it = item("311", vec![(1, dec!(180))]);
        let id = it.fees[0].id;
        assert!(!it.remove_fee_entry(id));
        assert_eq!(it.fees.len(), 1);
    }

    #[test]
    fn test_remove_fee_entry() {
        let mut it = item("311", vec![(1, dec!(180)), (1, dec!(90))]);
        let id = it.fees[1].id;
        assert!(it.remove_fee_entry(id));
        assert_eq!(it.fees.len(), 1);
        assert_eq!(it.total_fee(), dec!(180));
    }

    #[test]
    fn test_blank_item_detection() {
        let mut it = TreatmentItem::new();
        assert!(it.is_blank());
        it.tooth = "18".into();
        assert!(it.is_blank());
        it.description = "Filling".into();
        assert!(!it.is_blank());
    }

    #[test]
    fn test_location_from_str_loose() {
        assert_eq!(
            Location::from_str_loose("SIA Dental Essendon"),
            Some(Location::Essendon)
        );
        assert_eq!(
            Location::from_str_loose("BURWOOD"),
            Some(Location::Burwood)
        );
        assert_eq!(Location::from_str_loose("Richmond"), None);
    }

    #[test]
    fn test_fee_entry_quantity_floor() {
        let e = FeeEntry::new(0, dec!(50));
        assert_eq!(e.quantity, 1);
    }
}
