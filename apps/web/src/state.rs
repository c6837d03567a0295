//! # Application State
//!
//! Everything a handler needs, cloned cheaply into each request.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           AppState                                      │
//! │                                                                         │
//! │  books: Arc<dyn BookRepository> ─┐                                     │
//! │  sales: Arc<dyn SaleRepository> ─┼─► MemoryStore   (storage = memory)  │
//! │                                  └─► Sqlite*Repo   (storage = sqlite)  │
//! │  revalidator: broadcast sender for /api/events                         │
//! │  low_stock_threshold: dashboard setting                                │
//! │  database: pool handle for /health (SQLite only)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use sellerbox_core::DEFAULT_LOW_STOCK_THRESHOLD;
use sellerbox_db::{BookRepository, Database, MemoryStore, SaleRepository};

use crate::config::StorageBackend;
use crate::revalidate::Revalidator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<dyn BookRepository>,
    pub sales: Arc<dyn SaleRepository>,
    pub revalidator: Revalidator,
    pub low_stock_threshold: i64,
    database: Option<Database>,
}

impl AppState {
    /// State over a fresh in-memory store.
    pub fn in_memory(low_stock_threshold: i64) -> Self {
        let store = MemoryStore::new();
        AppState {
            books: Arc::new(store.clone()),
            sales: Arc::new(store),
            revalidator: Revalidator::new(),
            low_stock_threshold,
            database: None,
        }
    }

    /// State over an open SQLite database.
    pub fn sqlite(db: Database, low_stock_threshold: i64) -> Self {
        AppState {
            books: Arc::new(db.books()),
            sales: Arc::new(db.sales()),
            revalidator: Revalidator::new(),
            low_stock_threshold,
            database: Some(db),
        }
    }

    pub fn backend(&self) -> StorageBackend {
        if self.database.is_some() {
            StorageBackend::Sqlite
        } else {
            StorageBackend::Memory
        }
    }

    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    /// Whether storage can serve queries. The memory store always can.
    pub async fn storage_healthy(&self) -> bool {
        match &self.database {
            Some(db) => db.health_check().await,
            None => true,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory(DEFAULT_LOW_STOCK_THRESHOLD)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.backend())
            .field("low_stock_threshold", &self.low_stock_threshold)
            .finish_non_exhaustive()
    }
}
