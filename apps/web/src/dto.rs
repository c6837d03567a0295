//! Wire shapes for the read endpoints.
//!
//! Money stays in integer minor units and tax rates in basis points; the UI
//! formats them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use sellerbox_core::{Book, Platform, Sale, SaleStatus, UNKNOWN_BOOK_NAME};

/// Book as returned to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: String,
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookDto {
    fn from(b: Book) -> Self {
        BookDto {
            id: b.id,
            code: b.code,
            name: b.name,
            quantity: b.quantity,
            description: b.description,
            cover_image_url: b.cover_image_url,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Sale joined with the name of its book.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDto {
    pub id: String,
    pub book_id: String,
    /// [`UNKNOWN_BOOK_NAME`] when the book has been deleted.
    pub book_name: String,
    pub date: NaiveDate,
    pub status: SaleStatus,
    pub platform: Platform,
    pub sale_amount_cents: Option<i64>,
    pub tax_rate_bps: Option<u32>,
    pub tax_amount_cents: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SaleDto {
    pub fn new(s: Sale, book_name: Option<&str>) -> Self {
        SaleDto {
            book_name: book_name.unwrap_or(UNKNOWN_BOOK_NAME).to_string(),
            id: s.id,
            book_id: s.book_id,
            date: s.date,
            status: s.status,
            platform: s.platform,
            sale_amount_cents: s.sale_amount_cents,
            tax_rate_bps: s.tax_rate_bps,
            tax_amount_cents: s.tax_amount_cents,
            notes: s.notes,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}
