//! # Domain Types
//!
//! Core domain types used throughout SellerBox.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │      Book       │   │       Sale       │   │   SaleStatus    │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  id (UUID)      │◄──│  book_id (soft)  │   │  InPreparation  │      │
//! │  │  code (unique)  │   │  date            │   │  InProcess      │      │
//! │  │  name           │   │  status          │   │  Shipped        │      │
//! │  │  quantity       │   │  platform        │   │  SoldInPerson ★ │      │
//! │  └─────────────────┘   │  sale_amount     │   │  Completed    ★ │      │
//! │                        │  tax_rate/amount │   │  Canceled       │      │
//! │  ┌─────────────────┐   └──────────────────┘   └─────────────────┘      │
//! │  │    Platform     │                          ★ = realized sale         │
//! │  │  Avito / Ozon   │                                                    │
//! │  │  SellerBox-web  │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Books have:
//! - `id`: UUID v4 - immutable, used for sale references
//! - `code`: business identifier, unique but editable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 600 bps = 6 % (simplified self-employed tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

/// Upper bound for a tax rate: 100 %.
pub const MAX_TAX_RATE_BPS: u32 = 10_000;

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Parses a percentage string ("6", "6.5", "6,25") into basis points.
    ///
    /// Returns `None` for malformed or negative input, and for rates finer
    /// than one basis point ("6.125"): a rate is never rounded. Bounds are
    /// checked by the validation layer.
    pub fn parse_percentage(input: &str) -> Option<TaxRate> {
        let fraction_digits = input
            .trim()
            .split_once(['.', ','])
            .map_or(0, |(_, fraction)| fraction.len());
        if fraction_digits > 2 {
            return None;
        }
        let bps = crate::money::parse_scaled(input, 2)?;
        u32::try_from(bps).ok().map(TaxRate)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Book
// =============================================================================

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Book {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Seller-facing article code, unique across the catalog.
    pub code: String,

    /// Title shown in listings.
    pub name: String,

    /// Units in stock, never negative.
    pub quantity: i64,

    pub description: Option<String>,

    pub cover_image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// True when stock is at or below `threshold`.
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.quantity <= threshold
    }
}

/// Fields for a new book; the repository assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Partial book update. `None` leaves a field untouched; the nested options
/// on nullable fields distinguish "keep" from "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub description: Option<Option<String>>,
    pub cover_image_url: Option<Option<String>>,
}

impl BookPatch {
    /// Merges this patch into `book` in place.
    pub fn apply_to(self, book: &mut Book) {
        if let Some(code) = self.code {
            book.code = code;
        }
        if let Some(name) = self.name {
            book.name = name;
        }
        if let Some(quantity) = self.quantity {
            book.quantity = quantity;
        }
        if let Some(description) = self.description {
            book.description = description;
        }
        if let Some(url) = self.cover_image_url {
            book.cover_image_url = url;
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// ## Lifecycle
/// ```text
///                ┌──────────────── any non-terminal ───────────────┐
///                │                                                  ▼
///  create ──► InProcess ◄──► InPreparation ◄──► Shipped ──► Completed ★
///                │                                     └──► SoldInPerson ★
///                └────────────────────────────────────────► Canceled
/// ```
/// Terminal: `Completed`, `SoldInPerson`, `Canceled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Order accepted, item being prepared.
    InPreparation,
    /// Initial status of every new sale.
    InProcess,
    /// Handed to the carrier.
    Shipped,
    /// Sold face to face.
    SoldInPerson,
    /// Delivered and paid.
    Completed,
    /// Called off.
    Canceled,
}

impl SaleStatus {
    /// Every status, in workflow order.
    pub const ALL: [SaleStatus; 6] = [
        SaleStatus::InPreparation,
        SaleStatus::InProcess,
        SaleStatus::Shipped,
        SaleStatus::SoldInPerson,
        SaleStatus::Completed,
        SaleStatus::Canceled,
    ];

    /// Realized sales have consumed a unit of stock and carry a sale amount.
    #[inline]
    pub const fn is_realized(&self) -> bool {
        matches!(self, SaleStatus::Completed | SaleStatus::SoldInPerson)
    }

    /// Terminal statuses accept no further status edits.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            SaleStatus::Completed | SaleStatus::SoldInPerson | SaleStatus::Canceled
        )
    }

    /// Wire name, identical to the serde representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::InPreparation => "in_preparation",
            SaleStatus::InProcess => "in_process",
            SaleStatus::Shipped => "shipped",
            SaleStatus::SoldInPerson => "sold_in_person",
            SaleStatus::Completed => "completed",
            SaleStatus::Canceled => "canceled",
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::InProcess
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SaleStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(())
    }
}

// =============================================================================
// Platform
// =============================================================================

/// Where a sale happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Avito,
    Ozon,
    /// The seller's own storefront.
    SellerboxWeb,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Avito, Platform::Ozon, Platform::SellerboxWeb];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Platform::Avito => "avito",
            Platform::Ozon => "ozon",
            Platform::SellerboxWeb => "sellerbox_web",
        }
    }

    /// Marketplace name as sellers know it.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Platform::Avito => "Avito",
            Platform::Ozon => "Ozon",
            Platform::SellerboxWeb => "SellerBox-web",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts both wire names (`sellerbox_web`) and display names (`SellerBox-web`).
impl FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s || p.display_name() == s)
            .ok_or(())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale of one book copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,

    /// Referenced book; may dangle after the book is deleted.
    pub book_id: String,

    /// Calendar date of the sale (no time-of-day).
    #[ts(as = "String")]
    pub date: NaiveDate,

    pub status: SaleStatus,

    pub platform: Platform,

    pub sale_amount_cents: Option<i64>,

    pub tax_rate_bps: Option<u32>,

    pub tax_amount_cents: Option<i64>,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn sale_amount(&self) -> Option<Money> {
        self.sale_amount_cents.map(Money::from_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> Option<TaxRate> {
        self.tax_rate_bps.map(TaxRate::from_bps)
    }

    #[inline]
    pub fn tax_amount(&self) -> Option<Money> {
        self.tax_amount_cents.map(Money::from_cents)
    }
}

/// Fields for a new sale. Status is not part of it: every sale starts
/// [`SaleStatus::InProcess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    pub book_id: String,
    pub date: NaiveDate,
    pub platform: Platform,
    pub notes: Option<String>,
}

/// Partial sale update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalePatch {
    pub status: Option<SaleStatus>,
    pub sale_amount_cents: Option<i64>,
    pub tax_rate_bps: Option<u32>,
    pub tax_amount_cents: Option<i64>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
}

impl SalePatch {
    /// Merges this patch into `sale` in place.
    pub fn apply_to(self, sale: &mut Sale) {
        if let Some(status) = self.status {
            sale.status = status;
        }
        if let Some(amount) = self.sale_amount_cents {
            sale.sale_amount_cents = Some(amount);
        }
        if let Some(rate) = self.tax_rate_bps {
            sale.tax_rate_bps = Some(rate);
        }
        if let Some(tax) = self.tax_amount_cents {
            sale.tax_amount_cents = Some(tax);
        }
        if let Some(notes) = self.notes {
            sale.notes = notes;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        let now = Utc::now();
        Book {
            id: "b-1".to_string(),
            code: "X1".to_string(),
            name: "Test".to_string(),
            quantity: 5,
            description: Some("first edition".to_string()),
            cover_image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_tax_rate_parse_percentage() {
        assert_eq!(TaxRate::parse_percentage("6").unwrap().bps(), 600);
        assert_eq!(TaxRate::parse_percentage("6,25").unwrap().bps(), 625);
        assert!(TaxRate::parse_percentage("-1").is_none());
        assert!(TaxRate::parse_percentage("six").is_none());
        assert!(TaxRate::parse_percentage("6.125").is_none());
        assert!(TaxRate::parse_percentage("6,125").is_none());
        assert!((TaxRate::from_bps(825).percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_realized_and_terminal_sets() {
        let realized: Vec<_> = SaleStatus::ALL.into_iter().filter(|s| s.is_realized()).collect();
        assert_eq!(realized, vec![SaleStatus::SoldInPerson, SaleStatus::Completed]);

        let terminal: Vec<_> = SaleStatus::ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(
            terminal,
            vec![SaleStatus::SoldInPerson, SaleStatus::Completed, SaleStatus::Canceled]
        );
    }

    #[test]
    fn test_status_wire_names_match_serde() {
        for status in SaleStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<SaleStatus>(), Ok(status));
        }
        assert!("done".parse::<SaleStatus>().is_err());
    }

    #[test]
    fn test_platform_accepts_display_names() {
        assert_eq!("SellerBox-web".parse::<Platform>(), Ok(Platform::SellerboxWeb));
        assert_eq!("sellerbox_web".parse::<Platform>(), Ok(Platform::SellerboxWeb));
        assert_eq!("Avito".parse::<Platform>(), Ok(Platform::Avito));
        assert!("ebay".parse::<Platform>().is_err());
    }

    #[test]
    fn test_book_patch_keeps_untouched_fields() {
        let mut book = sample_book();
        BookPatch {
            name: Some("Renamed".to_string()),
            description: Some(None),
            ..Default::default()
        }
        .apply_to(&mut book);

        assert_eq!(book.name, "Renamed");
        assert_eq!(book.code, "X1");
        assert_eq!(book.quantity, 5);
        assert_eq!(book.description, None);
    }

    #[test]
    fn test_sale_patch_notes_keep_or_clear() {
        let now = Utc::now();
        let mut sale = Sale {
            id: "s-1".to_string(),
            book_id: "b-1".to_string(),
            date: now.date_naive(),
            status: SaleStatus::InProcess,
            platform: Platform::Avito,
            sale_amount_cents: None,
            tax_rate_bps: None,
            tax_amount_cents: None,
            notes: Some("call first".to_string()),
            created_at: now,
            updated_at: now,
        };

        SalePatch {
            status: Some(SaleStatus::Shipped),
            ..Default::default()
        }
        .apply_to(&mut sale);
        assert_eq!(sale.notes.as_deref(), Some("call first"));

        SalePatch {
            notes: Some(None),
            ..Default::default()
        }
        .apply_to(&mut sale);
        assert_eq!(sale.notes, None);
        assert_eq!(sale.status, SaleStatus::Shipped);
    }

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::InProcess);
    }
}
