use crate::model::TreatmentItem;
use crate::schedule::FeeSchedule;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A single typed field-update operation on a treatment item.
///
/// Edits are dispatched through [`apply_item_edit`] so that the
/// auto-fill-on-code-change behaviour is an explicit transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEdit {
    SetCode(String),
    SetTooth(String),
    SetDescription(String),
    AddFeeEntry,
    UpdateFeeEntry {
        id: Uuid,
        quantity: u32,
        unit_fee: Decimal,
    },
    RemoveFeeEntry(Uuid),
}

/// Apply one edit to an item.
///
/// `SetCode` consults the fee schedule: a matching code fills the
/// description and the first fee entry's unit fee. The schedule only
/// auto-fills; unknown codes are kept as typed. Removing the last fee
/// entry is refused and leaves the item unchanged.
pub fn apply_item_edit(item: &mut TreatmentItem, edit: ItemEdit, schedule: &FeeSchedule) {
    match edit {
        ItemEdit::SetCode(code) => {
            if let Some(entry) = schedule.find_by_code(&code) {
                item.description = entry.description.clone();
                if let Some(first) = item.fees.first_mut() {
                    first.unit_fee = entry.fee;
                }
            }
            item.item_code = code;
        }
        ItemEdit::SetTooth(tooth) => item.tooth = tooth,
        ItemEdit::SetDescription(description) => item.description = description,
        ItemEdit::AddFeeEntry => {
            item.add_fee_entry();
        }
        ItemEdit::UpdateFeeEntry {
            id,
            quantity,
            unit_fee,
        } => {
            if let Some(entry) = item.fees.iter_mut().find(|f| f.id == id) {
                entry.quantity = quantity.max(1);
                entry.unit_fee = unit_fee;
            }
        }
        ItemEdit::RemoveFeeEntry(id) => {
            item.remove_fee_entry(id);
        }
    }
}
