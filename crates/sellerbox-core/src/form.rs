//! # Form Input & Action Results
//!
//! The uniform contract between the UI and every mutating action.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Raw form (FormData)          ActionState returned to the UI            │
//! │  ───────────────────          ───────────────────────────────           │
//! │  { "code": "",                { "message": "validation_failed",         │
//! │    "name": "Dune",              "errors": { "code": ["required"] } }    │
//! │    "quantity": "3" }                                                    │
//! │                               { "message": "book_added",                │
//! │                                 "errors": {},                           │
//! │                                 "resetKey": "7c1e…" }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every code is a stable translation key; the UI owns the human text.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, ValidationError};

/// Untyped form submission: input name → raw value.
pub type FormData = HashMap<String, String>;

/// Form input names as the UI submits them.
pub mod fields {
    pub const CODE: &str = "code";
    pub const NAME: &str = "name";
    pub const QUANTITY: &str = "quantity";
    pub const DESCRIPTION: &str = "description";
    pub const COVER_IMAGE_URL: &str = "coverImageUrl";
    pub const BOOK_ID: &str = "bookId";
    pub const DATE: &str = "date";
    pub const PLATFORM: &str = "platform";
    pub const STATUS: &str = "status";
    pub const SALE_AMOUNT: &str = "saleAmount";
    pub const TAX_RATE: &str = "taxRate";
    pub const TAX_AMOUNT: &str = "taxAmount";
    pub const NOTES: &str = "notes";
}

/// Returns the trimmed value of `key`, or `None` when absent or blank.
pub fn value<'a>(form: &'a FormData, key: &str) -> Option<&'a str> {
    form.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

// =============================================================================
// Message Codes
// =============================================================================

/// Every translation key an action can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MessageCode {
    // Success
    BookAdded,
    BookUpdated,
    SaleAdded,
    SaleUpdated,

    // Summary failures
    ValidationFailed,
    CodeInUse,
    BookNotFound,
    SaleNotFound,
    SaleFinalized,
    ServerError,

    // Field failures
    Required,
    InvalidNumber,
    NegativeQuantity,
    InvalidUrl,
    InvalidDateFormat,
    InvalidDate,
    DateOutOfRange,
    InvalidPlatform,
    InvalidStatus,
    InvalidAmount,
    InvalidTaxRate,
    SaleAmountRequired,
}

impl MessageCode {
    /// Wire name, identical to the serde representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageCode::BookAdded => "book_added",
            MessageCode::BookUpdated => "book_updated",
            MessageCode::SaleAdded => "sale_added",
            MessageCode::SaleUpdated => "sale_updated",
            MessageCode::ValidationFailed => "validation_failed",
            MessageCode::CodeInUse => "code_in_use",
            MessageCode::BookNotFound => "book_not_found",
            MessageCode::SaleNotFound => "sale_not_found",
            MessageCode::SaleFinalized => "sale_finalized",
            MessageCode::ServerError => "server_error",
            MessageCode::Required => "required",
            MessageCode::InvalidNumber => "invalid_number",
            MessageCode::NegativeQuantity => "negative_quantity",
            MessageCode::InvalidUrl => "invalid_url",
            MessageCode::InvalidDateFormat => "invalid_date_format",
            MessageCode::InvalidDate => "invalid_date",
            MessageCode::DateOutOfRange => "date_out_of_range",
            MessageCode::InvalidPlatform => "invalid_platform",
            MessageCode::InvalidStatus => "invalid_status",
            MessageCode::InvalidAmount => "invalid_amount",
            MessageCode::InvalidTaxRate => "invalid_tax_rate",
            MessageCode::SaleAmountRequired => "sale_amount_required",
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(
            self,
            MessageCode::BookAdded
                | MessageCode::BookUpdated
                | MessageCode::SaleAdded
                | MessageCode::SaleUpdated
        )
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// Field-level errors: input name → ordered codes (the first is surfaced).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<MessageCode>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `code` to the list for `field`.
    pub fn push(&mut self, field: impl Into<String>, code: MessageCode) {
        self.0.entry(field.into()).or_default().push(code);
    }

    /// Records a validation error under its own field.
    pub fn record(&mut self, error: &ValidationError) {
        self.push(error.field().to_string(), error.code());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The codes recorded for `field`, in insertion order.
    pub fn get(&self, field: &str) -> &[MessageCode] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The code the UI shows for `field`.
    pub fn first(&self, field: &str) -> Option<MessageCode> {
        self.get(field).first().copied()
    }
}

/// Collects the error side of a field parse, yielding the value otherwise.
pub(crate) fn collect<T>(errors: &mut FieldErrors, result: Result<T, ValidationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.record(&err);
            None
        }
    }
}

// =============================================================================
// Action State
// =============================================================================

/// What every mutating action hands back to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ActionState {
    pub message: MessageCode,

    pub errors: FieldErrors,

    /// Fresh on every success so the UI can remount (reset) the form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_key: Option<String>,
}

impl ActionState {
    /// Success with a new reset key.
    pub fn success(message: MessageCode) -> Self {
        ActionState {
            message,
            errors: FieldErrors::new(),
            reset_key: Some(Uuid::new_v4().to_string()),
        }
    }

    /// Failure without field details.
    pub fn failure(message: MessageCode) -> Self {
        ActionState {
            message,
            errors: FieldErrors::new(),
            reset_key: None,
        }
    }

    /// Validation failure carrying the field map.
    pub fn invalid(errors: FieldErrors) -> Self {
        ActionState {
            message: MessageCode::ValidationFailed,
            errors,
            reset_key: None,
        }
    }

    /// Failure whose summary code is also attached to one field.
    pub fn field_failure(message: MessageCode, field: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(field, message);
        ActionState {
            message,
            errors,
            reset_key: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.message.is_success()
    }
}

impl From<CoreError> for ActionState {
    fn from(err: CoreError) -> Self {
        let code = err.code();
        match err {
            CoreError::CodeInUse(_) => ActionState::field_failure(code, fields::CODE),
            CoreError::Validation(ref inner) => {
                let mut errors = FieldErrors::new();
                errors.record(inner);
                ActionState::invalid(errors)
            }
            _ => ActionState::failure(code),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        for code in [
            MessageCode::BookAdded,
            MessageCode::CodeInUse,
            MessageCode::DateOutOfRange,
            MessageCode::SaleAmountRequired,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{code}\""));
        }
    }

    #[test]
    fn test_field_errors_keep_order() {
        let mut errors = FieldErrors::new();
        errors.push("date", MessageCode::InvalidDate);
        errors.push("date", MessageCode::DateOutOfRange);

        assert_eq!(errors.first("date"), Some(MessageCode::InvalidDate));
        assert_eq!(errors.get("date").len(), 2);
        assert!(errors.get("platform").is_empty());
    }

    #[test]
    fn test_success_shape() {
        let state = ActionState::success(MessageCode::BookAdded);
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["message"], "book_added");
        assert_eq!(json["errors"], serde_json::json!({}));
        assert!(json["resetKey"].is_string());
    }

    #[test]
    fn test_failure_shape_omits_reset_key() {
        let mut errors = FieldErrors::new();
        errors.push(fields::CODE, MessageCode::Required);
        let json = serde_json::to_value(ActionState::invalid(errors)).unwrap();

        assert_eq!(json["message"], "validation_failed");
        assert_eq!(json["errors"]["code"], serde_json::json!(["required"]));
        assert!(json.get("resetKey").is_none());
    }

    #[test]
    fn test_code_in_use_lands_on_code_field() {
        let state = ActionState::from(CoreError::CodeInUse("X1".to_string()));
        assert_eq!(state.message, MessageCode::CodeInUse);
        assert_eq!(state.errors.first(fields::CODE), Some(MessageCode::CodeInUse));
    }

    #[test]
    fn test_value_trims_and_drops_blank() {
        let mut form = FormData::new();
        form.insert("name".to_string(), "  Dune ".to_string());
        form.insert("notes".to_string(), "   ".to_string());

        assert_eq!(value(&form, "name"), Some("Dune"));
        assert_eq!(value(&form, "notes"), None);
        assert_eq!(value(&form, "missing"), None);
    }
}
