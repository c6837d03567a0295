//! # sellerbox-core: Pure Business Logic for SellerBox
//!
//! Catalog, sale lifecycle and inventory rules as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SellerBox Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web UI (forms, tables)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + revalidate events               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    sellerbox-web (actions)                      │   │
//! │  │    add_book, update_book, add_sale, update_sale, ...            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ sellerbox-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  status   │  │ validation│  │   │
//! │  │   │   Book    │  │   Money   │  │ inventory │  │   forms   │  │   │
//! │  │   │   Sale    │  │  TaxRate  │  │   delta   │  │   dates   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 sellerbox-db (Storage Layer)                    │   │
//! │  │         repository traits, memory store, SQLite store           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Book, Sale, SaleStatus, Platform)
//! - [`money`] - Money type with integer arithmetic
//! - [`status`] - Status transition policy and inventory delta
//! - [`validation`] - Form schemas for books and sales
//! - [`form`] - Raw form input and the `ActionState` result shape
//! - [`stats`] - Dashboard aggregation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use sellerbox_core::status::next_inventory_delta;
//! use sellerbox_core::{Money, SaleStatus, TaxRate};
//!
//! let tax = Money::from_cents(10_000).calculate_tax(TaxRate::from_bps(600));
//! assert_eq!(tax.to_string(), "6.00");
//!
//! assert_eq!(next_inventory_delta(Some(SaleStatus::InProcess), SaleStatus::Completed), -1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod form;
pub mod money;
pub mod stats;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use form::{ActionState, FieldErrors, FormData, MessageCode};
pub use money::Money;
pub use stats::DashboardStats;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Shown in place of a book name when a sale points at a deleted book.
pub const UNKNOWN_BOOK_NAME: &str = "Unknown Book";

/// Books at or below this quantity count as low stock unless configured.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 1;
