//! # Dashboard Statistics
//!
//! Pure aggregation over the current catalog and sales. The caller loads both
//! collections; nothing here knows about storage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Book, Platform, Sale, SaleStatus};

/// A book at or below the low-stock threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LowStockBook {
    pub id: String,
    pub code: String,
    pub name: String,
    pub quantity: i64,
}

/// Numbers shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_titles: usize,
    pub units_in_stock: i64,
    pub low_stock_threshold: i64,
    pub low_stock: Vec<LowStockBook>,
    pub total_sales: usize,
    /// Sales that are not yet in a terminal status.
    pub open_sales: usize,
    pub sales_by_status: BTreeMap<SaleStatus, usize>,
    pub sales_by_platform: BTreeMap<Platform, usize>,
    /// Sum of sale amounts over realized sales.
    pub revenue: Money,
    /// Sum of tax amounts over realized sales.
    pub tax_total: Money,
}

impl DashboardStats {
    pub fn compute(books: &[Book], sales: &[Sale], low_stock_threshold: i64) -> Self {
        let mut low_stock: Vec<LowStockBook> = books
            .iter()
            .filter(|book| book.is_low_stock(low_stock_threshold))
            .map(|book| LowStockBook {
                id: book.id.clone(),
                code: book.code.clone(),
                name: book.name.clone(),
                quantity: book.quantity,
            })
            .collect();
        // Emptiest shelves first
        low_stock.sort_by(|a, b| a.quantity.cmp(&b.quantity).then_with(|| a.code.cmp(&b.code)));

        let mut sales_by_status: BTreeMap<SaleStatus, usize> =
            SaleStatus::ALL.into_iter().map(|status| (status, 0)).collect();
        let mut sales_by_platform: BTreeMap<Platform, usize> =
            Platform::ALL.into_iter().map(|platform| (platform, 0)).collect();
        let mut revenue = Money::zero();
        let mut tax_total = Money::zero();
        let mut open_sales = 0;

        for sale in sales {
            *sales_by_status.entry(sale.status).or_default() += 1;
            *sales_by_platform.entry(sale.platform).or_default() += 1;
            if !sale.status.is_terminal() {
                open_sales += 1;
            }
            if sale.status.is_realized() {
                revenue += sale.sale_amount().unwrap_or_default();
                tax_total += sale.tax_amount().unwrap_or_default();
            }
        }

        DashboardStats {
            total_titles: books.len(),
            units_in_stock: books
                .iter()
                .fold(0, |total: i64, book| total.saturating_add(book.quantity)),
            low_stock_threshold,
            low_stock,
            total_sales: sales.len(),
            open_sales,
            sales_by_status,
            sales_by_platform,
            revenue,
            tax_total,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
