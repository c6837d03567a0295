//! # In-Memory Store
//!
//! Both repositories over one process-local collection pair. Used by tests
//! and by `storage = "memory"` deployments.
//!
//! A single mutex guards books and sales together, so a sale update and the
//! stock change it triggers happen in one critical section.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use sellerbox_core::status::next_inventory_delta;
use sellerbox_core::{Book, BookPatch, NewBook, NewSale, Sale, SalePatch, SaleStatus};

use super::{BookRepository, SaleRepository};
use crate::error::DbResult;

#[derive(Debug, Default)]
struct Inner {
    /// Newest first.
    books: Vec<Book>,
    /// Newest first.
    sales: Vec<Sale>,
}

/// Process-local storage. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Applies a stock delta to `book_id`, floored at zero. A dangling book id
/// is ignored.
fn adjust_stock(books: &mut [Book], book_id: &str, delta: i64) {
    if delta == 0 {
        return;
    }
    if let Some(book) = books.iter_mut().find(|b| b.id == book_id) {
        book.quantity = (book.quantity + delta).max(0);
        book.updated_at = Utc::now();
        debug!(book_id = %book_id, delta, quantity = book.quantity, "Adjusted stock");
    }
}

// =============================================================================
// Books
// =============================================================================

#[async_trait]
impl BookRepository for MemoryStore {
    async fn list(&self) -> DbResult<Vec<Book>> {
        Ok(self.inner.lock().await.books.clone())
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Book>> {
        let inner = self.inner.lock().await;
        Ok(inner.books.iter().find(|b| b.id == id).cloned())
    }

    async fn get_by_code(&self, code: &str) -> DbResult<Option<Book>> {
        let inner = self.inner.lock().await;
        Ok(inner.books.iter().find(|b| b.code == code).cloned())
    }

    async fn create(&self, book: NewBook) -> DbResult<Book> {
        let now = Utc::now();
        let book = Book {
            id: Uuid::new_v4().to_string(),
            code: book.code,
            name: book.name,
            quantity: book.quantity,
            description: book.description,
            cover_image_url: book.cover_image_url,
            created_at: now,
            updated_at: now,
        };
        debug!(id = %book.id, code = %book.code, "Creating book");

        self.inner.lock().await.books.insert(0, book.clone());
        Ok(book)
    }

    async fn update(&self, id: &str, patch: BookPatch) -> DbResult<Option<Book>> {
        debug!(id = %id, "Updating book");

        let mut inner = self.inner.lock().await;
        let Some(book) = inner.books.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        patch.apply_to(book);
        book.updated_at = Utc::now();
        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting book");

        let mut inner = self.inner.lock().await;
        let before = inner.books.len();
        inner.books.retain(|b| b.id != id);
        Ok(inner.books.len() != before)
    }
}

// =============================================================================
// Sales
// =============================================================================

#[async_trait]
impl SaleRepository for MemoryStore {
    async fn list(&self) -> DbResult<Vec<Sale>> {
        Ok(self.inner.lock().await.sales.clone())
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let inner = self.inner.lock().await;
        Ok(inner.sales.iter().find(|s| s.id == id).cloned())
    }

    async fn list_by_book(&self, book_id: &str) -> DbResult<Vec<Sale>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sales
            .iter()
            .filter(|s| s.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn create(&self, sale: NewSale) -> DbResult<Sale> {
        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            book_id: sale.book_id,
            date: sale.date,
            status: SaleStatus::InProcess,
            platform: sale.platform,
            sale_amount_cents: None,
            tax_rate_bps: None,
            tax_amount_cents: None,
            notes: sale.notes,
            created_at: now,
            updated_at: now,
        };
        debug!(id = %sale.id, book_id = %sale.book_id, "Creating sale");

        let mut inner = self.inner.lock().await;
        adjust_stock(
            &mut inner.books,
            &sale.book_id,
            next_inventory_delta(None, sale.status),
        );
        inner.sales.insert(0, sale.clone());
        Ok(sale)
    }

    async fn update(&self, id: &str, patch: SalePatch) -> DbResult<Option<Sale>> {
        debug!(id = %id, status = ?patch.status, "Updating sale");

        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let Some(sale) = inner.sales.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        let old_status = sale.status;
        patch.apply_to(sale);
        sale.updated_at = Utc::now();

        let delta = next_inventory_delta(Some(old_status), sale.status);
        adjust_stock(&mut inner.books, &sale.book_id, delta);
        Ok(Some(sale.clone()))
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting sale");

        let mut inner = self.inner.lock().await;
        let before = inner.sales.len();
        inner.sales.retain(|s| s.id != id);
        Ok(inner.sales.len() != before)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
