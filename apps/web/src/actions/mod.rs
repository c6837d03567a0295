//! # Actions Module
//!
//! Request-facing operations behind every form in the UI.
//!
//! ## Action Organization
//! ```text
//! actions/
//! ├── mod.rs      ◄─── You are here (shared failure handling)
//! ├── book.rs     ◄─── add/update/delete book, catalog reads, dashboard
//! └── sale.rs     ◄─── add/update/delete sale, sales list
//! ```
//!
//! ## How Actions Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Action Flow                                     │
//! │                                                                         │
//! │  FormData ──► parse_*_form ──Err──► validation_failed + field codes     │
//! │                    │                (storage untouched)                 │
//! │                    ▼ Ok                                                 │
//! │  business checks (code_in_use, book_not_found, sale_finalized)          │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  repository call ──DbError──► logged, server_error                      │
//! │                    │                                                    │
//! │                    ▼ Ok                                                 │
//! │  revalidate [dashboard, inventory, catalog, sales]                      │
//! │  ActionState { message: *_added | *_updated, resetKey }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutating actions never return `Err`: every outcome is an
//! [`ActionState`], and the UI switches on its `message`.

pub mod book;
pub mod sale;

use chrono::{Local, NaiveDate};
use tracing::{error, warn};

use sellerbox_core::form::fields;
use sellerbox_core::{ActionState, CoreError, FieldErrors, MessageCode};
use sellerbox_db::DbError;

use crate::revalidate::View;
use crate::state::AppState;

pub use book::{add_book, dashboard, delete_book, get_book, list_books, update_book};
pub use sale::{add_sale, delete_sale, list_sales, update_sale};

/// Server-local calendar date, the upper bound for sale dates.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Why an action stopped before succeeding.
#[derive(Debug)]
pub(crate) enum ActionError {
    Invalid(FieldErrors),
    Rejected(ActionState),
    Core(CoreError),
    Storage(DbError),
}

impl From<FieldErrors> for ActionError {
    fn from(errors: FieldErrors) -> Self {
        ActionError::Invalid(errors)
    }
}

impl From<CoreError> for ActionError {
    fn from(err: CoreError) -> Self {
        ActionError::Core(err)
    }
}

impl From<DbError> for ActionError {
    fn from(err: DbError) -> Self {
        ActionError::Storage(err)
    }
}

impl ActionError {
    fn into_state(self, action: &'static str) -> ActionState {
        match self {
            ActionError::Invalid(errors) => {
                warn!(action, ?errors, "Validation failed");
                ActionState::invalid(errors)
            }
            ActionError::Rejected(state) => {
                warn!(action, message = %state.message, "Action rejected");
                state
            }
            ActionError::Core(err) => {
                warn!(action, error = %err, "Action rejected");
                ActionState::from(err)
            }
            // The UNIQUE index caught a code that slipped past the lookup
            ActionError::Storage(err) if err.is_duplicate_of(fields::CODE) => {
                warn!(action, error = %err, "Duplicate book code");
                ActionState::field_failure(MessageCode::CodeInUse, fields::CODE)
            }
            ActionError::Storage(err) => {
                error!(action, error = %err, "Storage failure");
                ActionState::failure(MessageCode::ServerError)
            }
        }
    }
}

pub(crate) type ActionResult<T> = Result<T, ActionError>;

/// Turns an action's outcome into its response and signals stale views on
/// success.
pub(crate) fn finish(state: &AppState, action: &'static str, result: ActionResult<ActionState>) -> ActionState {
    match result {
        Ok(outcome) => {
            state.revalidator.revalidate(&View::ALL);
            outcome
        }
        Err(err) => err.into_state(action),
    }
}

/// [`finish`] for deletes, which have no success message.
pub(crate) fn finish_delete(
    state: &AppState,
    action: &'static str,
    result: ActionResult<()>,
) -> Result<(), ActionState> {
    match result {
        Ok(()) => {
            state.revalidator.revalidate(&View::ALL);
            Ok(())
        }
        Err(err) => Err(err.into_state(action)),
    }
}
