//! # Sale Repository (SQLite)
//!
//! Sale operations against the `sales` table, including the stock side effect
//! on `books`.
//!
//! ## Update Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    SELECT sale                  → old status (None → return None)       │
//! │    merge patch                                                          │
//! │    UPDATE sales                                                         │
//! │    delta = next_inventory_delta(old, new)                               │
//! │    delta != 0 → UPDATE books SET quantity = MAX(quantity + delta, 0)    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use sellerbox_core::status::next_inventory_delta;
use sellerbox_core::{NewSale, Sale, SalePatch, SaleStatus};

use super::SaleRepository;
use crate::error::{DbError, DbResult};

/// SQLite-backed [`SaleRepository`].
#[derive(Debug, Clone)]
pub struct SqliteSaleRepository {
    pool: SqlitePool,
}

impl SqliteSaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSaleRepository { pool }
    }

    async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

async fn adjust_stock(
    tx: &mut Transaction<'static, Sqlite>,
    book_id: &str,
    delta: i64,
) -> DbResult<()> {
    if delta == 0 {
        return Ok(());
    }
    debug!(book_id = %book_id, delta, "Adjusting stock");

    // A dangling book id matches no row.
    sqlx::query(
        r#"
        UPDATE books
        SET quantity = MAX(quantity + ?2, 0),
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(book_id)
    .bind(delta)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl SaleRepository for SqliteSaleRepository {
    async fn list(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, book_id, date, status, platform,
                   sale_amount_cents, tax_rate_bps, tax_amount_cents, notes,
                   created_at, updated_at
            FROM sales
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, book_id, date, status, platform,
                   sale_amount_cents, tax_rate_bps, tax_amount_cents, notes,
                   created_at, updated_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    async fn list_by_book(&self, book_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, book_id, date, status, platform,
                   sale_amount_cents, tax_rate_bps, tax_amount_cents, notes,
                   created_at, updated_at
            FROM sales
            WHERE book_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
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

        debug!(id = %sale.id, book_id = %sale.book_id, platform = %sale.platform, "Inserting sale");

        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, book_id, date, status, platform,
                sale_amount_cents, tax_rate_bps, tax_amount_cents, notes,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.book_id)
        .bind(sale.date)
        .bind(sale.status)
        .bind(sale.platform)
        .bind(sale.sale_amount_cents)
        .bind(sale.tax_rate_bps)
        .bind(sale.tax_amount_cents)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        adjust_stock(&mut tx, &sale.book_id, next_inventory_delta(None, sale.status)).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(sale)
    }

    async fn update(&self, id: &str, patch: SalePatch) -> DbResult<Option<Sale>> {
        debug!(id = %id, status = ?patch.status, "Updating sale");

        let mut tx = self.begin().await?;

        let current = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, book_id, date, status, platform,
                   sale_amount_cents, tax_rate_bps, tax_amount_cents, notes,
                   created_at, updated_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut sale) = current else {
            return Ok(None);
        };
        let old_status = sale.status;
        patch.apply_to(&mut sale);
        sale.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE sales SET
                status = ?2,
                sale_amount_cents = ?3,
                tax_rate_bps = ?4,
                tax_amount_cents = ?5,
                notes = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&sale.id)
        .bind(sale.status)
        .bind(sale.sale_amount_cents)
        .bind(sale.tax_rate_bps)
        .bind(sale.tax_amount_cents)
        .bind(&sale.notes)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        let delta = next_inventory_delta(Some(old_status), sale.status);
        adjust_stock(&mut tx, &sale.book_id, delta).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(Some(sale))
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
