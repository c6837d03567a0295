//! # Status Transition Policy
//!
//! Decides what a sale status change means for the linked book's stock and
//! whether the change is allowed at all.
//!
//! ## Inventory Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  old status          new status           stock delta                  │
//! │  ───────────────     ───────────────      ───────────                  │
//! │  (none / create)     realized             -1                           │
//! │  non-realized        realized             -1                           │
//! │  realized            realized              0  (already consumed)       │
//! │  any                 non-realized          0  (no restock on cancel)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories call [`next_inventory_delta`] inside the same atomic unit that
//! writes the status. [`ensure_transition`] is for the action layer: the
//! repositories themselves accept writes to terminal sales.

use crate::error::{CoreError, CoreResult};
use crate::types::SaleStatus;

/// Stock change caused by moving a sale from `old` to `new`.
///
/// `old` is `None` when the sale is being created. Returns `-1` only when the
/// sale becomes realized for the first time.
///
/// ## Example
/// ```rust
/// use sellerbox_core::status::next_inventory_delta;
/// use sellerbox_core::SaleStatus;
///
/// assert_eq!(next_inventory_delta(Some(SaleStatus::Shipped), SaleStatus::Completed), -1);
/// assert_eq!(next_inventory_delta(Some(SaleStatus::Completed), SaleStatus::SoldInPerson), 0);
/// assert_eq!(next_inventory_delta(None, SaleStatus::InProcess), 0);
/// ```
pub fn next_inventory_delta(old: Option<SaleStatus>, new: SaleStatus) -> i64 {
    let was_realized = old.is_some_and(|status| status.is_realized());
    if new.is_realized() && !was_realized {
        -1
    } else {
        0
    }
}

/// Whether a user may move a sale from `from` to `to`.
///
/// Non-terminal statuses may go anywhere, including back to themselves;
/// terminal statuses go nowhere.
pub fn can_transition(from: SaleStatus, _to: SaleStatus) -> bool {
    !from.is_terminal()
}

/// [`can_transition`] as a `Result`, for the action layer.
pub fn ensure_transition(sale_id: &str, from: SaleStatus, to: SaleStatus) -> CoreResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::SaleFinalized {
            sale_id: sale_id.to_string(),
            status: from.to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_realization_decrements() {
        for old in [SaleStatus::InPreparation, SaleStatus::InProcess, SaleStatus::Shipped] {
            assert_eq!(next_inventory_delta(Some(old), SaleStatus::Completed), -1);
            assert_eq!(next_inventory_delta(Some(old), SaleStatus::SoldInPerson), -1);
        }
    }

    #[test]
    fn test_realized_again_is_free() {
        for old in [SaleStatus::Completed, SaleStatus::SoldInPerson] {
            for new in [SaleStatus::Completed, SaleStatus::SoldInPerson] {
                assert_eq!(next_inventory_delta(Some(old), new), 0);
            }
        }
    }

    #[test]
    fn test_non_realized_targets_never_touch_stock() {
        for old in SaleStatus::ALL {
            for new in [
                SaleStatus::InPreparation,
                SaleStatus::InProcess,
                SaleStatus::Shipped,
                SaleStatus::Canceled,
            ] {
                assert_eq!(next_inventory_delta(Some(old), new), 0, "{old} -> {new}");
            }
        }
    }

    #[test]
    fn test_creation_path() {
        assert_eq!(next_inventory_delta(None, SaleStatus::InProcess), 0);
        assert_eq!(next_inventory_delta(None, SaleStatus::Completed), -1);
    }

    #[test]
    fn test_terminal_statuses_are_locked() {
        assert!(can_transition(SaleStatus::Shipped, SaleStatus::Canceled));
        assert!(can_transition(SaleStatus::InProcess, SaleStatus::InProcess));
        assert!(!can_transition(SaleStatus::Completed, SaleStatus::Completed));
        assert!(!can_transition(SaleStatus::Canceled, SaleStatus::InProcess));

        let err = ensure_transition("s-1", SaleStatus::SoldInPerson, SaleStatus::Completed)
            .unwrap_err();
        assert!(matches!(err, CoreError::SaleFinalized { ref status, .. } if status == "sold_in_person"));
    }
}
