//! # Repository Module
//!
//! Storage contracts for SellerBox and their implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Action (web app)                                                      │
//! │       │                                                                 │
//! │       │  state.sales.update(id, patch)                                 │
//! │       ▼                                                                 │
//! │  Arc<dyn SaleRepository>                                               │
//! │       │                                                                 │
//! │       ├──► MemoryStore          (tests, storage = "memory")            │
//! │       │      one mutex over books + sales                              │
//! │       │                                                                 │
//! │       └──► SqliteSaleRepository (storage = "sqlite")                   │
//! │              one transaction per update                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract Notes
//! - Unknown ids are not errors: `get_by_id`/`update` return `None` and
//!   `delete` returns `false`.
//! - Code uniqueness is policy, not storage: `create`/`update` accept any
//!   code. The SQLite store still refuses duplicates through its index.
//! - Sale `create` and `update` apply
//!   [`next_inventory_delta`](sellerbox_core::status::next_inventory_delta)
//!   to the linked book in the same atomic unit as the write.
//!
//! ## Available Repositories
//!
//! - [`BookRepository`] - Catalog CRUD
//! - [`SaleRepository`] - Sale CRUD with inventory side effects

use async_trait::async_trait;
use sellerbox_core::{Book, BookPatch, NewBook, NewSale, Sale, SalePatch};

use crate::error::DbResult;

pub mod book;
pub mod memory;
pub mod sale;

/// Catalog storage.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books, most recently created first.
    async fn list(&self) -> DbResult<Vec<Book>>;

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Book>>;

    async fn get_by_code(&self, code: &str) -> DbResult<Option<Book>>;

    /// Inserts a book with a fresh UUID v4 id.
    async fn create(&self, book: NewBook) -> DbResult<Book>;

    /// Merges `patch` into the stored book. `None` when the id is unknown.
    async fn update(&self, id: &str, patch: BookPatch) -> DbResult<Option<Book>>;

    /// Whether a row was removed.
    async fn delete(&self, id: &str) -> DbResult<bool>;
}

/// Sale storage.
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// All sales, most recently created first.
    async fn list(&self) -> DbResult<Vec<Sale>>;

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>>;

    /// Sales referencing `book_id`, most recently created first.
    async fn list_by_book(&self, book_id: &str) -> DbResult<Vec<Sale>>;

    /// Inserts a sale in [`SaleStatus::InProcess`](sellerbox_core::SaleStatus::InProcess).
    async fn create(&self, sale: NewSale) -> DbResult<Sale>;

    /// Merges `patch` and, on first realization, takes one unit from the
    /// linked book (never below zero). `None` when the id is unknown.
    async fn update(&self, id: &str, patch: SalePatch) -> DbResult<Option<Sale>>;

    /// Whether a row was removed. Stock is left as is.
    async fn delete(&self, id: &str) -> DbResult<bool>;
}
