//! # Book Repository (SQLite)
//!
//! Catalog operations against the `books` table.
//!
//! ## Code Uniqueness
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Action layer:   get_by_code("X1") → someone else? → code_in_use        │
//! │                          │                                              │
//! │                          ▼ (race window)                                │
//! │  This layer:     INSERT ... → idx_books_code → UniqueViolation{code}    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Both paths end in the same `code_in_use` result.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use sellerbox_core::{Book, BookPatch, NewBook};

use super::BookRepository;
use crate::error::{DbError, DbResult};

/// SQLite-backed [`BookRepository`].
#[derive(Debug, Clone)]
pub struct SqliteBookRepository {
    pool: SqlitePool,
}

impl SqliteBookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteBookRepository { pool }
    }

    /// Counts books (for diagnostics and the seed binary).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Attaches the offending code to a unique violation.
fn with_code(err: sqlx::Error, code: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, code),
        other => other,
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn list(&self) -> DbResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, code, name, quantity, description, cover_image_url,
                   created_at, updated_at
            FROM books
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = books.len(), "Listed books");
        Ok(books)
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, code, name, quantity, description, cover_image_url,
                   created_at, updated_at
            FROM books
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    async fn get_by_code(&self, code: &str) -> DbResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, code, name, quantity, description, cover_image_url,
                   created_at, updated_at
            FROM books
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
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

        debug!(id = %book.id, code = %book.code, "Inserting book");

        sqlx::query(
            r#"
            INSERT INTO books (
                id, code, name, quantity, description, cover_image_url,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&book.id)
        .bind(&book.code)
        .bind(&book.name)
        .bind(book.quantity)
        .bind(&book.description)
        .bind(&book.cover_image_url)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_code(e, &book.code))?;

        Ok(book)
    }

    /// Read-merge-write inside one transaction.
    async fn update(&self, id: &str, patch: BookPatch) -> DbResult<Option<Book>> {
        debug!(id = %id, "Updating book");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let current = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, code, name, quantity, description, cover_image_url,
                   created_at, updated_at
            FROM books
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut book) = current else {
            return Ok(None);
        };
        patch.apply_to(&mut book);
        book.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE books SET
                code = ?2,
                name = ?3,
                quantity = ?4,
                description = ?5,
                cover_image_url = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&book.id)
        .bind(&book.code)
        .bind(&book.name)
        .bind(book.quantity)
        .bind(&book.description)
        .bind(&book.cover_image_url)
        .bind(book.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| with_code(e, &book.code))?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(Some(book))
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting book");

        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn new_book(code: &str) -> NewBook {
        NewBook {
            code: code.to_string(),
            name: "Test".to_string(),
            quantity: 5,
            description: Some("paperback".to_string()),
            cover_image_url: None,
        }
    }

    async fn repo() -> SqliteBookRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.books()
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = repo().await;
        let created = repo.create(new_book("X1")).await.unwrap();

        let by_id = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.code, "X1");
        assert_eq!(by_id.description.as_deref(), Some("paperback"));

        let by_code = repo.get_by_code("X1").await.unwrap().unwrap();
        assert_eq!(by_code.id, created.id);
        assert!(repo.get_by_code("nope").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_refused() {
        let repo = repo().await;
        repo.create(new_book("X1")).await.unwrap();

        let err = repo.create(new_book("X1")).await.unwrap_err();
        assert!(err.is_duplicate_of("code"), "{err}");
    }

    #[tokio::test]
    async fn test_update_merges() {
        let repo = repo().await;
        let created = repo.create(new_book("X1")).await.unwrap();

        let patch = BookPatch {
            name: Some("Renamed".to_string()),
            description: Some(None),
            ..Default::default()
        };
        let updated = repo.update(&created.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.quantity, 5);
        assert_eq!(updated.description, None);

        let stored = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");

        assert!(repo
            .update("missing", BookPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_and_delete() {
        let repo = repo().await;
        let a = repo.create(new_book("A")).await.unwrap();
        let b = repo.create(new_book("B")).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![b.id.clone(), a.id.clone()]);

        assert!(repo.delete(&a.id).await.unwrap());
        assert!(!repo.delete(&a.id).await.unwrap());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
