//! Sale actions and the sales list.
//!
//! ## Update Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  current status      submitted status       result                      │
//! │  ──────────────      ────────────────       ──────                      │
//! │  in_process          completed + amount     sale_updated, stock -1      │
//! │  shipped             completed, no amount   validation_failed           │
//! │  completed           anything               sale_finalized              │
//! │  (unknown id)        anything               sale_not_found              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

use sellerbox_core::form::fields;
use sellerbox_core::status::ensure_transition;
use sellerbox_core::validation::{parse_new_sale_form, parse_sale_update_form};
use sellerbox_core::{ActionState, CoreError, FormData, MessageCode};

use super::{finish, finish_delete, today, ActionError, ActionResult};
use crate::dto::SaleDto;
use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Mutations
// =============================================================================

/// Records a new sale in `in_process` for an existing book.
///
/// ## Outcomes
/// - `sale_added` with a fresh `resetKey`
/// - `validation_failed` (date format, real date, range, platform)
/// - `book_not_found` on `bookId`
/// - `server_error`
pub async fn add_sale(state: &AppState, form: &FormData) -> ActionState {
    let result = try_add_sale(state, form).await;
    finish(state, "add_sale", result)
}

async fn try_add_sale(state: &AppState, form: &FormData) -> ActionResult<ActionState> {
    let new_sale = parse_new_sale_form(form, today())?;

    if state.books.get_by_id(&new_sale.book_id).await?.is_none() {
        return Err(ActionError::Rejected(ActionState::field_failure(
            MessageCode::BookNotFound,
            fields::BOOK_ID,
        )));
    }

    let sale = state.sales.create(new_sale).await?;
    info!(
        id = %sale.id,
        book_id = %sale.book_id,
        platform = %sale.platform,
        date = %sale.date,
        "Sale added"
    );

    Ok(ActionState::success(MessageCode::SaleAdded))
}

/// Moves a sale to a new status and records its amounts.
///
/// Tax is recomputed from amount and rate when both are present. The first
/// move into a realized status takes one unit off the book's stock; that
/// happens inside the repository update.
pub async fn update_sale(state: &AppState, id: &str, form: &FormData) -> ActionState {
    let result = try_update_sale(state, id, form).await;
    finish(state, "update_sale", result)
}

async fn try_update_sale(state: &AppState, id: &str, form: &FormData) -> ActionResult<ActionState> {
    let input = parse_sale_update_form(form)?;

    let current = state
        .sales
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(id.to_string()))?;
    ensure_transition(id, current.status, input.status)?;

    let sale = state
        .sales
        .update(id, input.into_patch())
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(id.to_string()))?;
    info!(
        id = %sale.id,
        from = %current.status,
        to = %sale.status,
        amount_cents = ?sale.sale_amount_cents,
        tax_cents = ?sale.tax_amount_cents,
        "Sale updated"
    );

    Ok(ActionState::success(MessageCode::SaleUpdated))
}

/// Deletes a sale. Stock is left as it is; unknown ids succeed.
pub async fn delete_sale(state: &AppState, id: &str) -> Result<(), ActionState> {
    let result = try_delete_sale(state, id).await;
    finish_delete(state, "delete_sale", result)
}

async fn try_delete_sale(state: &AppState, id: &str) -> ActionResult<()> {
    let removed = state.sales.delete(id).await?;
    info!(id = %id, removed, "Sale deleted");
    Ok(())
}

// =============================================================================
// Reads
// =============================================================================

/// Every sale, most recent first, with its book's name.
pub async fn list_sales(state: &AppState) -> Result<Vec<SaleDto>, ApiError> {
    let start = Instant::now();
    let books = state.books.list().await?;
    let sales = state.sales.list().await?;

    let names: HashMap<&str, &str> = books
        .iter()
        .map(|b| (b.id.as_str(), b.name.as_str()))
        .collect();

    let dtos: Vec<SaleDto> = sales
        .into_iter()
        .map(|s| {
            let name = names.get(s.book_id.as_str()).copied();
            SaleDto::new(s, name)
        })
        .collect();

    debug!(
        count = dtos.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Sales listed"
    );
    Ok(dtos)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::book::{add_book, delete_book, get_book, list_books};
    use chrono::Duration;
    use sellerbox_core::{SaleStatus, UNKNOWN_BOOK_NAME};

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn today_str() -> String {
        today().format("%d.%m.%Y").to_string()
    }

    /// A book with `quantity` units and one `in_process` sale on it.
    async fn setup(quantity: i64) -> (AppState, String, String) {
        let state = AppState::default();
        let added = add_book(
            &state,
            &form(&[("code", "X1"), ("name", "Test"), ("quantity", &quantity.to_string())]),
        )
        .await;
        assert!(added.is_success());
        let book_id = list_books(&state).await.unwrap()[0].id.clone();

        let date = today_str();
        let added = add_sale(
            &state,
            &form(&[("bookId", &book_id), ("date", &date), ("platform", "avito")]),
        )
        .await;
        assert_eq!(added.message, MessageCode::SaleAdded);
        let sale_id = list_sales(&state).await.unwrap()[0].id.clone();

        (state, book_id, sale_id)
    }

    async fn quantity(state: &AppState, book_id: &str) -> i64 {
        get_book(state, book_id).await.unwrap().quantity
    }

    #[tokio::test]
    async fn test_add_sale_starts_in_process() {
        let (state, book_id, _) = setup(5).await;

        let sales = list_sales(&state).await.unwrap();
        assert_eq!(sales[0].status, SaleStatus::InProcess);
        assert_eq!(sales[0].book_name, "Test");
        assert_eq!(sales[0].date, today());
        assert_eq!(quantity(&state, &book_id).await, 5);
    }

    #[tokio::test]
    async fn test_add_sale_unknown_book() {
        let state = AppState::default();
        let date = today_str();

        let result = add_sale(
            &state,
            &form(&[("bookId", "missing"), ("date", &date), ("platform", "ozon")]),
        )
        .await;
        assert_eq!(result.message, MessageCode::BookNotFound);
        assert_eq!(result.errors.first(fields::BOOK_ID), Some(MessageCode::BookNotFound));
        assert!(list_sales(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_sale_rejects_bad_dates() {
        let (state, book_id, _) = setup(1).await;
        let tomorrow = (today() + Duration::days(1)).format("%d.%m.%Y").to_string();

        for (date, code) in [
            ("2025-01-01", MessageCode::InvalidDateFormat),
            ("31.02.2024", MessageCode::InvalidDate),
            ("31.12.1999", MessageCode::DateOutOfRange),
            (tomorrow.as_str(), MessageCode::DateOutOfRange),
        ] {
            let result = add_sale(
                &state,
                &form(&[("bookId", &book_id), ("date", date), ("platform", "avito")]),
            )
            .await;
            assert_eq!(result.message, MessageCode::ValidationFailed, "{date}");
            assert_eq!(result.errors.first(fields::DATE), Some(code), "{date}");
        }
        assert_eq!(list_sales(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_decrements_once() {
        let (state, book_id, sale_id) = setup(5).await;

        let result = update_sale(
            &state,
            &sale_id,
            &form(&[("status", "completed"), ("saleAmount", "1000")]),
        )
        .await;
        assert_eq!(result.message, MessageCode::SaleUpdated);
        assert_eq!(quantity(&state, &book_id).await, 4);

        // Terminal now, so a second realized update never reaches storage
        let result = update_sale(
            &state,
            &sale_id,
            &form(&[("status", "sold_in_person"), ("saleAmount", "1000")]),
        )
        .await;
        assert_eq!(result.message, MessageCode::SaleFinalized);
        assert_eq!(quantity(&state, &book_id).await, 4);
    }

    #[tokio::test]
    async fn test_tax_is_computed() {
        let (state, _, sale_id) = setup(3).await;

        update_sale(
            &state,
            &sale_id,
            &form(&[
                ("status", "completed"),
                ("saleAmount", "2499"),
                ("taxRate", "6"),
                ("taxAmount", "1"),
            ]),
        )
        .await;

        let sale = list_sales(&state).await.unwrap().remove(0);
        assert_eq!(sale.sale_amount_cents, Some(249_900));
        assert_eq!(sale.tax_rate_bps, Some(600));
        assert_eq!(sale.tax_amount_cents, Some(14_994));
    }

    #[tokio::test]
    async fn test_fractional_rate_tax_is_stored() {
        let (state, _, sale_id) = setup(3).await;

        let result = update_sale(
            &state,
            &sale_id,
            &form(&[("status", "completed"), ("saleAmount", "1000"), ("taxRate", "6.25")]),
        )
        .await;
        assert_eq!(result.message, MessageCode::SaleUpdated);

        let sale = list_sales(&state).await.unwrap().remove(0);
        assert_eq!(sale.tax_rate_bps, Some(625));
        assert_eq!(sale.tax_amount_cents, Some(6_250));
    }

    #[tokio::test]
    async fn test_rate_finer_than_basis_point_rejected() {
        let (state, book_id, sale_id) = setup(3).await;

        let result = update_sale(
            &state,
            &sale_id,
            &form(&[("status", "completed"), ("saleAmount", "1000"), ("taxRate", "6.125")]),
        )
        .await;
        assert_eq!(result.message, MessageCode::ValidationFailed);
        assert_eq!(
            result.errors.first(fields::TAX_RATE),
            Some(MessageCode::InvalidTaxRate)
        );

        let sale = list_sales(&state).await.unwrap().remove(0);
        assert_eq!(sale.status, SaleStatus::InProcess);
        assert_eq!(sale.tax_amount_cents, None);
        assert_eq!(quantity(&state, &book_id).await, 3);
    }

    #[tokio::test]
    async fn test_amount_rounded_to_cents_before_tax() {
        let (state, _, sale_id) = setup(3).await;

        let result = update_sale(
            &state,
            &sale_id,
            &form(&[("status", "completed"), ("saleAmount", "0.005"), ("taxRate", "50")]),
        )
        .await;
        assert_eq!(result.message, MessageCode::SaleUpdated);

        let sale = list_sales(&state).await.unwrap().remove(0);
        assert_eq!(sale.sale_amount_cents, Some(1));
        assert_eq!(sale.tax_amount_cents, Some(1));
    }

    #[tokio::test]
    async fn test_three_decimal_amount_is_stored_rounded() {
        let (state, _, sale_id) = setup(3).await;

        update_sale(
            &state,
            &sale_id,
            &form(&[("status", "sold_in_person"), ("saleAmount", "24.999"), ("taxRate", "6")]),
        )
        .await;

        let sale = list_sales(&state).await.unwrap().remove(0);
        assert_eq!(sale.sale_amount_cents, Some(2_500));
        assert_eq!(sale.tax_amount_cents, Some(150));
    }

    #[tokio::test]
    async fn test_oversized_amounts_keep_dashboard_alive() {
        let (state, _, sale_id) = setup(3).await;

        let result = update_sale(
            &state,
            &sale_id,
            &form(&[("status", "completed"), ("saleAmount", "90000000000000000")]),
        )
        .await;
        assert_eq!(
            result.errors.first(fields::SALE_AMOUNT),
            Some(MessageCode::InvalidAmount)
        );
        assert!(crate::actions::dashboard(&state).await.is_ok());
    }

    #[tokio::test]
    async fn test_blank_notes_clear_previous_notes() {
        let (state, _, sale_id) = setup(3).await;

        update_sale(
            &state,
            &sale_id,
            &form(&[("status", "in_preparation"), ("notes", "call first")]),
        )
        .await;
        let sale = list_sales(&state).await.unwrap().remove(0);
        assert_eq!(sale.notes.as_deref(), Some("call first"));

        let result = update_sale(
            &state,
            &sale_id,
            &form(&[("status", "shipped"), ("notes", "")]),
        )
        .await;
        assert_eq!(result.message, MessageCode::SaleUpdated);
        let sale = list_sales(&state).await.unwrap().remove(0);
        assert_eq!(sale.notes, None);
    }

    #[tokio::test]
    async fn test_realized_status_needs_amount() {
        let (state, book_id, sale_id) = setup(2).await;

        let result = update_sale(&state, &sale_id, &form(&[("status", "completed")])).await;
        assert_eq!(result.message, MessageCode::ValidationFailed);
        assert_eq!(
            result.errors.first(fields::SALE_AMOUNT),
            Some(MessageCode::SaleAmountRequired)
        );
        assert_eq!(quantity(&state, &book_id).await, 2);
    }

    #[tokio::test]
    async fn test_non_realized_moves_keep_stock() {
        let (state, book_id, sale_id) = setup(2).await;

        for status in ["shipped", "in_preparation", "canceled"] {
            let result = update_sale(&state, &sale_id, &form(&[("status", status)])).await;
            assert_eq!(result.message, MessageCode::SaleUpdated, "{status}");
        }
        assert_eq!(quantity(&state, &book_id).await, 2);
    }

    #[tokio::test]
    async fn test_update_unknown_sale() {
        let state = AppState::default();
        let result = update_sale(&state, "missing", &form(&[("status", "shipped")])).await;
        assert_eq!(result.message, MessageCode::SaleNotFound);
    }

    #[tokio::test]
    async fn test_deleted_book_shows_unknown() {
        let (state, book_id, _) = setup(1).await;
        delete_book(&state, &book_id).await.unwrap();

        let sales = list_sales(&state).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].book_name, UNKNOWN_BOOK_NAME);
    }

    #[tokio::test]
    async fn test_delete_sale_leaves_stock() {
        let (state, book_id, sale_id) = setup(3).await;
        update_sale(
            &state,
            &sale_id,
            &form(&[("status", "completed"), ("saleAmount", "10")]),
        )
        .await;

        delete_sale(&state, &sale_id).await.unwrap();
        assert!(list_sales(&state).await.unwrap().is_empty());
        assert_eq!(quantity(&state, &book_id).await, 2);
        assert!(delete_sale(&state, &sale_id).await.is_ok());
    }
}
