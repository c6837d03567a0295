//! # sellerbox-db: Storage Layer for SellerBox
//!
//! Repository traits for books and sales, plus two implementations: a
//! process-local [`MemoryStore`] and SQLite repositories on a sqlx pool.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SellerBox Data Flow                              │
//! │                                                                         │
//! │  Action (update_sale)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   sellerbox-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  Repository   │    │  MemoryStore  │    │   Database   │  │   │
//! │  │   │    traits     │◄───│ (memory.rs)   │    │  (pool.rs)   │  │   │
//! │  │   │               │    └───────────────┘    │              │  │   │
//! │  │   │ BookRepository│    ┌───────────────┐    │ SqlitePool   │  │   │
//! │  │   │ SaleRepository│◄───│ Sqlite*Repo   │◄───│ migrations   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │              <data dir>/sellerbox/sellerbox.db                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository traits and implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sellerbox_db::{BookRepository, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("sellerbox.db")).await?;
//! let books = db.books().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::book::SqliteBookRepository;
pub use repository::memory::MemoryStore;
pub use repository::sale::SqliteSaleRepository;
pub use repository::{BookRepository, SaleRepository};
