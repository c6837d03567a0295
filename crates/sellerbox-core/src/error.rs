//! # Error Types
//!
//! Domain-specific error types for sellerbox-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sellerbox-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures (one per field)      │
//! │                                                                         │
//! │  sellerbox-db errors (separate crate)                                  │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  web errors (in app)                                                   │
//! │  └── ApiError         - What the HTTP client sees                      │
//! │                                                                         │
//! │  Flow: ValidationError → FieldErrors → ActionState → Frontend          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every variant maps to a stable [`MessageCode`] translation key
//! 3. Errors are enum variants, never String

use chrono::NaiveDate;
use thiserror::Error;

use crate::form::MessageCode;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Raised by the pure rules in [`crate::status`] and [`crate::validation`]
/// and translated by the action layer into an `ActionState`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Book cannot be found.
    #[error("Book not found: {0}")]
    BookNotFound(String),

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Another book already uses this code.
    ///
    /// ## User Workflow
    /// ```text
    /// Add Book (code: "X1")
    ///      │
    ///      ▼
    /// Lookup by code: found "X1" with a different id
    ///      │
    ///      ▼
    /// CodeInUse("X1")
    ///      │
    ///      ▼
    /// UI shows code_in_use under the code input
    /// ```
    #[error("Book code '{0}' is already in use")]
    CodeInUse(String),

    /// Sale is in a terminal status; no further status edits are accepted.
    #[error("Sale {sale_id} is {status}, no further changes allowed")]
    SaleFinalized { sale_id: String, status: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the translation key for this error.
    pub fn code(&self) -> MessageCode {
        match self {
            CoreError::BookNotFound(_) => MessageCode::BookNotFound,
            CoreError::SaleNotFound(_) => MessageCode::SaleNotFound,
            CoreError::CodeInUse(_) => MessageCode::CodeInUse,
            CoreError::SaleFinalized { .. } => MessageCode::SaleFinalized,
            CoreError::Validation(_) => MessageCode::ValidationFailed,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the offending form field so the error can be attached
/// to the right input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value could not be read as a number.
    #[error("{field} must be a number")]
    InvalidNumber { field: String },

    /// Quantity is below zero.
    #[error("{field} must not be negative")]
    NegativeQuantity { field: String },

    /// URL is not an http(s) URL.
    #[error("{field} must be an http(s) URL")]
    InvalidUrl { field: String },

    /// Date string does not match `DD.MM.YYYY`.
    #[error("{field} must use the DD.MM.YYYY format")]
    InvalidDateFormat { field: String },

    /// Date string matches the format but is not a real calendar date.
    #[error("{field} '{value}' is not a real calendar date")]
    InvalidDate { field: String, value: String },

    /// Date lies outside the accepted window.
    #[error("{field} must be between {min} and {max}")]
    DateOutOfRange {
        field: String,
        min: NaiveDate,
        max: NaiveDate,
    },

    /// Platform is not one of the supported marketplaces.
    #[error("{field} '{value}' is not a supported platform")]
    InvalidPlatform { field: String, value: String },

    /// Status is not one of the sale statuses.
    #[error("{field} '{value}' is not a valid sale status")]
    InvalidStatus { field: String, value: String },

    /// Money amount is malformed or negative.
    #[error("{field} must be a non-negative amount")]
    InvalidAmount { field: String },

    /// Tax rate is malformed or outside 0-100 %.
    #[error("{field} must be a percentage between 0 and 100")]
    InvalidTaxRate { field: String },

    /// A realized sale needs its sale amount.
    #[error("{field} is required for a realized sale")]
    SaleAmountRequired { field: String },
}

impl ValidationError {
    /// Returns the form field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::InvalidNumber { field }
            | ValidationError::NegativeQuantity { field }
            | ValidationError::InvalidUrl { field }
            | ValidationError::InvalidDateFormat { field }
            | ValidationError::InvalidDate { field, .. }
            | ValidationError::DateOutOfRange { field, .. }
            | ValidationError::InvalidPlatform { field, .. }
            | ValidationError::InvalidStatus { field, .. }
            | ValidationError::InvalidAmount { field }
            | ValidationError::InvalidTaxRate { field }
            | ValidationError::SaleAmountRequired { field } => field,
        }
    }

    /// Returns the translation key for this error.
    pub fn code(&self) -> MessageCode {
        match self {
            ValidationError::Required { .. } => MessageCode::Required,
            ValidationError::InvalidNumber { .. } => MessageCode::InvalidNumber,
            ValidationError::NegativeQuantity { .. } => MessageCode::NegativeQuantity,
            ValidationError::InvalidUrl { .. } => MessageCode::InvalidUrl,
            ValidationError::InvalidDateFormat { .. } => MessageCode::InvalidDateFormat,
            ValidationError::InvalidDate { .. } => MessageCode::InvalidDate,
            ValidationError::DateOutOfRange { .. } => MessageCode::DateOutOfRange,
            ValidationError::InvalidPlatform { .. } => MessageCode::InvalidPlatform,
            ValidationError::InvalidStatus { .. } => MessageCode::InvalidStatus,
            ValidationError::InvalidAmount { .. } => MessageCode::InvalidAmount,
            ValidationError::InvalidTaxRate { .. } => MessageCode::InvalidTaxRate,
            ValidationError::SaleAmountRequired { .. } => MessageCode::SaleAmountRequired,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
