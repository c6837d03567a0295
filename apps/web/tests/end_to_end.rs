//! Full sale lifecycle through the actions, against both storage backends.

use sellerbox_core::{FormData, MessageCode, SaleStatus};
use sellerbox_db::{Database, DbConfig};
use sellerbox_web::{actions, AppState, View};

fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn run_lifecycle(state: AppState) {
    let mut events = state.revalidator.subscribe();

    let result = actions::add_book(
        &state,
        &form(&[("code", "X1"), ("name", "Test"), ("quantity", "5")]),
    )
    .await;
    assert_eq!(result.message, MessageCode::BookAdded);
    assert_eq!(events.try_recv().unwrap(), View::ALL.to_vec());

    let book_id = actions::list_books(&state).await.unwrap()[0].id.clone();

    let today = actions::today().format("%d.%m.%Y").to_string();
    let result = actions::add_sale(
        &state,
        &form(&[("bookId", &book_id), ("date", &today), ("platform", "avito")]),
    )
    .await;
    assert_eq!(result.message, MessageCode::SaleAdded);

    let sale = actions::list_sales(&state).await.unwrap().remove(0);
    assert_eq!(sale.status, SaleStatus::InProcess);
    assert_eq!(actions::get_book(&state, &book_id).await.unwrap().quantity, 5);

    let result = actions::update_sale(
        &state,
        &sale.id,
        &form(&[("status", "completed"), ("saleAmount", "1000")]),
    )
    .await;
    assert_eq!(result.message, MessageCode::SaleUpdated);
    assert_eq!(actions::get_book(&state, &book_id).await.unwrap().quantity, 4);

    let stats = actions::dashboard(&state).await.unwrap();
    assert_eq!(stats.revenue.cents(), 100_000);
    assert_eq!(stats.open_sales, 0);
    assert_eq!(stats.sales_by_status[&SaleStatus::Completed], 1);
}

#[tokio::test]
async fn test_lifecycle_in_memory() {
    run_lifecycle(AppState::in_memory(1)).await;
}

#[tokio::test]
async fn test_lifecycle_sqlite() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    run_lifecycle(AppState::sqlite(db, 1)).await;
}

#[tokio::test]
async fn test_sqlite_code_uniqueness() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let state = AppState::sqlite(db, 1);
    let book = form(&[("code", "X1"), ("name", "Test"), ("quantity", "1")]);

    assert!(actions::add_book(&state, &book).await.is_success());
    let result = actions::add_book(&state, &book).await;
    assert_eq!(result.message, MessageCode::CodeInUse);
}
