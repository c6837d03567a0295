//! Book actions and catalog reads.

use std::time::Instant;
use tracing::{debug, info};

use sellerbox_core::validation::{ensure_code_available, parse_book_form};
use sellerbox_core::{ActionState, CoreError, DashboardStats, FormData, MessageCode};

use super::{finish, finish_delete, ActionResult};
use crate::dto::BookDto;
use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Mutations
// =============================================================================

/// Adds a book to the catalog.
///
/// ## Outcomes
/// - `book_added` with a fresh `resetKey`
/// - `validation_failed` with field codes
/// - `code_in_use` on `code` when another book has the code
/// - `server_error`
pub async fn add_book(state: &AppState, form: &FormData) -> ActionState {
    let result = try_add_book(state, form).await;
    finish(state, "add_book", result)
}

async fn try_add_book(state: &AppState, form: &FormData) -> ActionResult<ActionState> {
    let input = parse_book_form(form)?;

    let existing = state.books.get_by_code(&input.code).await?;
    ensure_code_available(existing.as_ref(), None, &input.code)?;

    let book = state.books.create(input.into_new_book()).await?;
    info!(id = %book.id, code = %book.code, quantity = book.quantity, "Book added");

    Ok(ActionState::success(MessageCode::BookAdded))
}

/// Replaces a book's fields. The book keeping its own code is not a
/// conflict.
pub async fn update_book(state: &AppState, id: &str, form: &FormData) -> ActionState {
    let result = try_update_book(state, id, form).await;
    finish(state, "update_book", result)
}

async fn try_update_book(state: &AppState, id: &str, form: &FormData) -> ActionResult<ActionState> {
    let input = parse_book_form(form)?;

    if state.books.get_by_id(id).await?.is_none() {
        return Err(CoreError::BookNotFound(id.to_string()).into());
    }

    let existing = state.books.get_by_code(&input.code).await?;
    ensure_code_available(existing.as_ref(), Some(id), &input.code)?;

    let book = state
        .books
        .update(id, input.into_patch())
        .await?
        .ok_or_else(|| CoreError::BookNotFound(id.to_string()))?;
    info!(id = %book.id, code = %book.code, quantity = book.quantity, "Book updated");

    Ok(ActionState::success(MessageCode::BookUpdated))
}

/// Deletes a book. Unknown ids succeed; sales referencing the book are kept.
pub async fn delete_book(state: &AppState, id: &str) -> Result<(), ActionState> {
    let result = try_delete_book(state, id).await;
    finish_delete(state, "delete_book", result)
}

async fn try_delete_book(state: &AppState, id: &str) -> ActionResult<()> {
    let removed = state.books.delete(id).await?;
    info!(id = %id, removed, "Book deleted");
    Ok(())
}

// =============================================================================
// Reads
// =============================================================================

/// Every book, most recent first.
pub async fn list_books(state: &AppState) -> Result<Vec<BookDto>, ApiError> {
    let start = Instant::now();
    let books = state.books.list().await?;

    debug!(
        count = books.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Books listed"
    );
    Ok(books.into_iter().map(BookDto::from).collect())
}

pub async fn get_book(state: &AppState, id: &str) -> Result<BookDto, ApiError> {
    state
        .books
        .get_by_id(id)
        .await?
        .map(BookDto::from)
        .ok_or_else(|| ApiError::not_found("Book", id))
}

/// Dashboard statistics over the whole catalog and sales history.
pub async fn dashboard(state: &AppState) -> Result<DashboardStats, ApiError> {
    let start = Instant::now();
    let books = state.books.list().await?;
    let sales = state.sales.list().await?;
    let stats = DashboardStats::compute(&books, &sales, state.low_stock_threshold);

    debug!(
        titles = stats.total_titles,
        sales = stats.total_sales,
        elapsed_ms = start.elapsed().as_millis(),
        "Dashboard computed"
    );
    Ok(stats)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use sellerbox_core::form::fields;

    fn book_form(code: &str, name: &str, quantity: &str) -> FormData {
        FormData::from([
            (fields::CODE.to_string(), code.to_string()),
            (fields::NAME.to_string(), name.to_string()),
            (fields::QUANTITY.to_string(), quantity.to_string()),
            (fields::DESCRIPTION.to_string(), "Test book".to_string()),
        ])
    }

    async fn only_book(state: &AppState) -> BookDto {
        let mut books = list_books(state).await.unwrap();
        assert_eq!(books.len(), 1);
        books.remove(0)
    }

    #[tokio::test]
    async fn test_add_book() {
        let state = AppState::default();

        let result = add_book(&state, &book_form("X1", "Test", "5")).await;
        assert_eq!(result.message, MessageCode::BookAdded);
        assert!(result.reset_key.is_some());

        let book = only_book(&state).await;
        assert_eq!(book.code, "X1");
        assert_eq!(book.quantity, 5);
        assert_eq!(book.description.as_deref(), Some("Test book"));
    }

    #[tokio::test]
    async fn test_add_book_validation_touches_nothing() {
        let state = AppState::default();

        let result = add_book(&state, &book_form(" ", "Test", "-2")).await;
        assert_eq!(result.message, MessageCode::ValidationFailed);
        assert_eq!(result.errors.first(fields::CODE), Some(MessageCode::Required));
        assert_eq!(
            result.errors.first(fields::QUANTITY),
            Some(MessageCode::NegativeQuantity)
        );
        assert!(list_books(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_code_on_add() {
        let state = AppState::default();
        add_book(&state, &book_form("X1", "First", "1")).await;

        let result = add_book(&state, &book_form("X1", "Second", "2")).await;
        assert_eq!(result.message, MessageCode::CodeInUse);
        assert_eq!(result.errors.first(fields::CODE), Some(MessageCode::CodeInUse));
        assert_eq!(list_books(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_own_code() {
        let state = AppState::default();
        add_book(&state, &book_form("X1", "Test", "5")).await;
        let book = only_book(&state).await;

        let result = update_book(&state, &book.id, &book_form("X1", "Renamed", "7")).await;
        assert_eq!(result.message, MessageCode::BookUpdated);

        let book = get_book(&state, &book.id).await.unwrap();
        assert_eq!(book.name, "Renamed");
        assert_eq!(book.quantity, 7);
    }

    #[tokio::test]
    async fn test_update_onto_other_code() {
        let state = AppState::default();
        add_book(&state, &book_form("X1", "First", "1")).await;
        add_book(&state, &book_form("X2", "Second", "1")).await;
        let second = get_by_code(&state, "X2").await;

        let result = update_book(&state, &second.id, &book_form("X1", "Second", "1")).await;
        assert_eq!(result.message, MessageCode::CodeInUse);
        assert_eq!(get_book(&state, &second.id).await.unwrap().code, "X2");
    }

    #[tokio::test]
    async fn test_update_unknown_book() {
        let state = AppState::default();
        let result = update_book(&state, "missing", &book_form("X1", "Test", "1")).await;
        assert_eq!(result.message, MessageCode::BookNotFound);
    }

    #[tokio::test]
    async fn test_delete_book_missing_id_is_ok() {
        let state = AppState::default();
        assert!(delete_book(&state, "missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_book_removes_it() {
        let state = AppState::default();
        add_book(&state, &book_form("X1", "Test", "1")).await;
        let book = only_book(&state).await;

        delete_book(&state, &book.id).await.unwrap();
        let err = get_book(&state, &book.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_dashboard_uses_threshold() {
        let state = AppState::in_memory(2);
        add_book(&state, &book_form("X1", "Low", "2")).await;
        add_book(&state, &book_form("X2", "Plenty", "9")).await;

        let stats = dashboard(&state).await.unwrap();
        assert_eq!(stats.total_titles, 2);
        assert_eq!(stats.units_in_stock, 11);
        assert_eq!(stats.low_stock.len(), 1);
        assert_eq!(stats.low_stock[0].code, "X1");
    }

    async fn get_by_code(state: &AppState, code: &str) -> BookDto {
        list_books(state)
            .await
            .unwrap()
            .into_iter()
            .find(|b| b.code == code)
            .unwrap()
    }
}
