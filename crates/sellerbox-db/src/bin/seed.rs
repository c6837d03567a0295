//! # Seed Data Generator
//!
//! Populates a SQLite database with demo books and sales for development.
//!
//! ## Usage
//! ```bash
//! # Generate 40 books (default)
//! cargo run -p sellerbox-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p sellerbox-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p sellerbox-db --bin seed -- --db ./data/sellerbox.db
//! ```
//!
//! Every third book gets a sale; every other sale is completed, which
//! takes one unit off that book's stock.

use chrono::{Duration, Local};
use std::env;

use sellerbox_core::{NewBook, NewSale, Platform, SalePatch, SaleStatus, TaxRate, Money};
use sellerbox_db::{BookRepository, Database, DbConfig, SaleRepository};

/// Authors and titles for realistic listings
const TITLES: &[(&str, &[&str])] = &[
    (
        "TOL",
        &["War and Peace", "Anna Karenina", "Resurrection", "Hadji Murat"],
    ),
    (
        "DOS",
        &[
            "Crime and Punishment",
            "The Idiot",
            "Demons",
            "The Brothers Karamazov",
        ],
    ),
    (
        "BUL",
        &["The Master and Margarita", "Heart of a Dog", "The White Guard"],
    ),
    (
        "STR",
        &["Roadside Picnic", "Hard to Be a God", "Monday Begins on Saturday"],
    ),
    ("CHE", &["The Cherry Orchard", "The Seagull", "Ward No. 6"]),
];

/// Editions multiply the catalog
const EDITIONS: &[&str] = &["Paperback", "Hardcover", "Collector's"];

/// Self-employed tax rate
const TAX_RATE_BPS: u32 = 600;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 40;
    let mut db_path = String::from("./sellerbox_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(40);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("SellerBox Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of books to generate (default: 40)");
                println!("  -d, --db <PATH>    Database file path (default: ./sellerbox_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("SellerBox Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Books:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.books().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} books", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let books = db.books();
    let sales = db.sales();
    let today = Local::now().date_naive();

    let mut generated = 0;
    let mut sold = 0;

    'outer: for (author, titles) in TITLES {
        for (title_idx, title) in titles.iter().enumerate() {
            for (edition_idx, edition) in EDITIONS.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }
                let seed = generated;

                let book = NewBook {
                    code: format!("{}-{:02}{}", author, title_idx + 1, edition_idx),
                    name: format!("{} ({})", title, edition),
                    quantity: (seed % 7) as i64,
                    description: Some(format!("{} edition of {}", edition, title)),
                    cover_image_url: None,
                };
                let book = match books.create(book).await {
                    Ok(book) => book,
                    Err(e) => {
                        eprintln!("Failed to insert book: {}", e);
                        continue;
                    }
                };
                generated += 1;

                if seed % 3 != 0 {
                    continue;
                }
                let platform = Platform::ALL[seed % Platform::ALL.len()];
                let sale = sales
                    .create(NewSale {
                        book_id: book.id.clone(),
                        date: today - Duration::days((seed % 30) as i64),
                        platform,
                        notes: None,
                    })
                    .await?;

                if seed % 2 == 0 {
                    let amount = Money::from_cents(50_000 + (seed as i64 * 1_250) % 100_000);
                    let rate = TaxRate::from_bps(TAX_RATE_BPS);
                    sales
                        .update(
                            &sale.id,
                            SalePatch {
                                status: Some(SaleStatus::Completed),
                                sale_amount_cents: Some(amount.cents()),
                                tax_rate_bps: Some(rate.bps()),
                                tax_amount_cents: Some(amount.calculate_tax(rate).cents()),
                                notes: None,
                            },
                        )
                        .await?;
                }
                sold += 1;
            }
        }
    }

    println!();
    println!("✓ Generated {} books and {} sales", generated, sold);
    println!("✓ Seed complete!");

    Ok(())
}
