//! # Validation Layer
//!
//! Turns untyped [`FormData`] into typed inputs, or a [`FieldErrors`] map.
//!
//! ## Schemas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Book            code*, name*, quantity* (>= 0), description,           │
//! │                  coverImageUrl (http/https)                             │
//! │                                                                         │
//! │  New sale        bookId*, date* (DD.MM.YYYY, real, 2000-01-01..today),  │
//! │                  platform*, notes                                       │
//! │                                                                         │
//! │  Sale update     status*, saleAmount (required when realized),          │
//! │                  taxRate (0..100 %), taxAmount, notes                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                              * = required
//! ```
//!
//! Every field is checked; all failures are reported together. Nothing here
//! touches storage, so uniqueness lives in [`ensure_code_available`] and is
//! called by the action layer with the looked-up record.

use chrono::{Datelike, NaiveDate};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::form::{collect, fields, value, FieldErrors, FormData};
use crate::money::Money;
use crate::types::{
    Book, BookPatch, NewBook, NewSale, Platform, SalePatch, SaleStatus, TaxRate, MAX_TAX_RATE_BPS,
};

/// Largest accepted sale or tax amount: one billion in major units.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Earliest accepted sale date.
pub fn min_sale_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

// =============================================================================
// Field Parsers
// =============================================================================

fn required<'a>(form: &'a FormData, field: &str) -> Result<&'a str, ValidationError> {
    value(form, field).ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })
}

/// Parses a stock quantity: a whole, non-negative number.
///
/// Integral decimal forms such as "5.0" or "5e0" count as whole numbers.
pub fn parse_quantity(raw: Option<&str>) -> Result<i64, ValidationError> {
    let field = fields::QUANTITY.to_string();
    let raw = raw.ok_or_else(|| ValidationError::Required { field: field.clone() })?;
    let quantity = parse_whole_number(raw)
        .ok_or_else(|| ValidationError::InvalidNumber { field: field.clone() })?;
    if quantity < 0 {
        return Err(ValidationError::NegativeQuantity { field });
    }
    Ok(quantity)
}

fn parse_whole_number(raw: &str) -> Option<i64> {
    if let Ok(number) = raw.parse::<i64>() {
        return Some(number);
    }
    // Past 2^53 an f64 no longer holds every integer exactly.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    let number: f64 = raw.parse().ok()?;
    (number.is_finite() && number.fract() == 0.0 && number.abs() <= MAX_EXACT)
        .then_some(number as i64)
}

fn parse_cover_url(raw: Option<&str>) -> Result<Option<String>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            Ok(Some(url.to_string()))
        }
        Some(_) => Err(ValidationError::InvalidUrl {
            field: fields::COVER_IMAGE_URL.to_string(),
        }),
    }
}

/// Parses a `DD.MM.YYYY` sale date and checks it against `[2000-01-01, today]`.
///
/// The string is split into day, month and year and rebuilt as a calendar
/// date. Overflowing days are rejected rather than rolled into the next month.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use sellerbox_core::validation::parse_sale_date;
///
/// let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// assert!(parse_sale_date("28.02.2025", today).is_ok());
/// assert!(parse_sale_date("31.02.2025", today).is_err());
/// assert!(parse_sale_date("11.03.2025", today).is_err());
/// ```
pub fn parse_sale_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let field = fields::DATE;
    let format_error = || ValidationError::InvalidDateFormat {
        field: field.to_string(),
    };

    let parts: Vec<&str> = raw.split('.').collect();
    let [day, month, year] = parts.as_slice() else {
        return Err(format_error());
    };
    let well_formed = [(day, 2), (month, 2), (year, 4)]
        .iter()
        .all(|(part, len)| part.len() == *len && part.chars().all(|c| c.is_ascii_digit()));
    if !well_formed {
        return Err(format_error());
    }

    let (day, month, year) = match (day.parse::<u32>(), month.parse::<u32>(), year.parse::<i32>()) {
        (Ok(d), Ok(m), Ok(y)) => (d, m, y),
        _ => return Err(format_error()),
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .filter(|date| date.day() == day)
        .ok_or_else(|| ValidationError::InvalidDate {
            field: field.to_string(),
            value: raw.to_string(),
        })?;

    let min = min_sale_date();
    if date < min || date > today {
        return Err(ValidationError::DateOutOfRange {
            field: field.to_string(),
            min,
            max: today,
        });
    }
    Ok(date)
}

/// Parses a non-negative money amount up to [`MAX_AMOUNT_CENTS`].
///
/// Extra fractional digits are rounded half up to whole cents.
pub fn parse_amount(raw: &str, field: &str) -> Result<Money, ValidationError> {
    Money::parse(raw)
        .filter(|money| (0..=MAX_AMOUNT_CENTS).contains(&money.cents()))
        .ok_or_else(|| ValidationError::InvalidAmount {
            field: field.to_string(),
        })
}

/// Parses a tax percentage in `[0, 100]` with at most two decimals.
pub fn parse_tax_rate(raw: &str) -> Result<TaxRate, ValidationError> {
    TaxRate::parse_percentage(raw)
        .filter(|rate| rate.bps() <= MAX_TAX_RATE_BPS)
        .ok_or_else(|| ValidationError::InvalidTaxRate {
            field: fields::TAX_RATE.to_string(),
        })
}

// =============================================================================
// Book Schema
// =============================================================================

/// A validated book form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInput {
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
}

impl BookInput {
    pub fn into_new_book(self) -> NewBook {
        NewBook {
            code: self.code,
            name: self.name,
            quantity: self.quantity,
            description: self.description,
            cover_image_url: self.cover_image_url,
        }
    }

    /// The edit form submits every field, so a blank optional clears it.
    pub fn into_patch(self) -> BookPatch {
        BookPatch {
            code: Some(self.code),
            name: Some(self.name),
            quantity: Some(self.quantity),
            description: Some(self.description),
            cover_image_url: Some(self.cover_image_url),
        }
    }
}

pub fn parse_book_form(form: &FormData) -> Result<BookInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let code = collect(&mut errors, required(form, fields::CODE));
    let name = collect(&mut errors, required(form, fields::NAME));
    let quantity = collect(&mut errors, parse_quantity(value(form, fields::QUANTITY)));
    let cover_image_url = collect(
        &mut errors,
        parse_cover_url(value(form, fields::COVER_IMAGE_URL)),
    );

    match (code, name, quantity, cover_image_url) {
        (Some(code), Some(name), Some(quantity), Some(cover_image_url)) => {
            Ok(BookInput {
                code: code.to_string(),
                name: name.to_string(),
                quantity,
                description: value(form, fields::DESCRIPTION).map(str::to_string),
                cover_image_url,
            })
        }
        _ => Err(errors),
    }
}

/// Fails with `CodeInUse` when `existing` holds the code and is not the
/// record being edited.
pub fn ensure_code_available(
    existing: Option<&Book>,
    editing_id: Option<&str>,
    code: &str,
) -> CoreResult<()> {
    match existing {
        Some(book) if Some(book.id.as_str()) != editing_id => {
            Err(CoreError::CodeInUse(code.to_string()))
        }
        _ => Ok(()),
    }
}

// =============================================================================
// Sale Schemas
// =============================================================================

/// Validates the new-sale form. `today` is the server-local date.
pub fn parse_new_sale_form(form: &FormData, today: NaiveDate) -> Result<NewSale, FieldErrors> {
    let mut errors = FieldErrors::new();

    let book_id = collect(&mut errors, required(form, fields::BOOK_ID));
    let date = collect(
        &mut errors,
        required(form, fields::DATE).and_then(|raw| parse_sale_date(raw, today)),
    );
    let platform = collect(
        &mut errors,
        required(form, fields::PLATFORM).and_then(|raw| {
            raw.parse::<Platform>()
                .map_err(|_| ValidationError::InvalidPlatform {
                    field: fields::PLATFORM.to_string(),
                    value: raw.to_string(),
                })
        }),
    );

    match (book_id, date, platform) {
        (Some(book_id), Some(date), Some(platform)) => Ok(NewSale {
            book_id: book_id.to_string(),
            date,
            platform,
            notes: value(form, fields::NOTES).map(str::to_string),
        }),
        _ => Err(errors),
    }
}

/// A validated sale-update form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleUpdateInput {
    pub status: SaleStatus,
    pub sale_amount: Option<Money>,
    pub tax_rate: Option<TaxRate>,
    pub tax_amount: Option<Money>,
    pub notes: Option<String>,
}

impl SaleUpdateInput {
    /// Tax is derived from amount and rate when both are known; a submitted
    /// tax amount is only kept otherwise.
    pub fn effective_tax(&self) -> Option<Money> {
        match (self.sale_amount, self.tax_rate) {
            (Some(amount), Some(rate)) => Some(amount.calculate_tax(rate)),
            _ => self.tax_amount,
        }
    }

    /// The edit form submits notes, so a blank value clears them.
    pub fn into_patch(self) -> SalePatch {
        let tax_amount = self.effective_tax();
        SalePatch {
            status: Some(self.status),
            sale_amount_cents: self.sale_amount.map(|m| m.cents()),
            tax_rate_bps: self.tax_rate.map(|r| r.bps()),
            tax_amount_cents: tax_amount.map(|m| m.cents()),
            notes: Some(self.notes),
        }
    }
}

pub fn parse_sale_update_form(form: &FormData) -> Result<SaleUpdateInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let status = collect(
        &mut errors,
        required(form, fields::STATUS).and_then(|raw| {
            raw.parse::<SaleStatus>()
                .map_err(|_| ValidationError::InvalidStatus {
                    field: fields::STATUS.to_string(),
                    value: raw.to_string(),
                })
        }),
    );
    let sale_amount = value(form, fields::SALE_AMOUNT)
        .map(|raw| collect(&mut errors, parse_amount(raw, fields::SALE_AMOUNT)));
    let tax_rate = value(form, fields::TAX_RATE).map(|raw| collect(&mut errors, parse_tax_rate(raw)));
    let tax_amount = value(form, fields::TAX_AMOUNT)
        .map(|raw| collect(&mut errors, parse_amount(raw, fields::TAX_AMOUNT)));

    if let (Some(status), None) = (status, sale_amount) {
        if status.is_realized() {
            errors.record(&ValidationError::SaleAmountRequired {
                field: fields::SALE_AMOUNT.to_string(),
            });
        }
    }

    match status {
        Some(status) if errors.is_empty() => Ok(SaleUpdateInput {
            status,
            sale_amount: sale_amount.flatten(),
            tax_rate: tax_rate.flatten(),
            tax_amount: tax_amount.flatten(),
            notes: value(form, fields::NOTES).map(str::to_string),
        }),
        _ => Err(errors),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
