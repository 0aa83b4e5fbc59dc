//! # Seed Data Generator
//!
//! Populates the store with sample counter-service products for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p balcao-db --bin seed
//!
//! # Specify database path
//! cargo run -p balcao-db --bin seed -- --db ./data/balcao.db
//! ```

use chrono::Utc;
use std::env;

use balcao_core::{Money, Product};
use balcao_db::{Ledger, StoreConfig};

/// Sample catalog: (name, category, quantity, price in cents).
const SAMPLE_PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Coffee", "Drinks", 100, 350),
    ("Espresso", "Drinks", 100, 300),
    ("Iced Tea", "Drinks", 60, 275),
    ("Soda", "Drinks", 48, 200),
    ("Orange Juice", "Drinks", 24, 400),
    ("Bottled Water", "Drinks", 72, 150),
    ("Cheese Sandwich", "Food", 20, 650),
    ("Ham Sandwich", "Food", 20, 700),
    ("Hot Dog", "Food", 30, 500),
    ("Burger", "Food", 25, 950),
    ("Fries", "Food", 40, 450),
    ("Slice Of Pie", "Desserts", 12, 550),
    ("Brownie", "Desserts", 18, 400),
    ("Cookie", "Desserts", 36, 250),
    ("Ice Cream Cup", "Desserts", 24, 475),
    ("Potato Chips", "Snacks", 50, 300),
    ("Chocolate Bar", "Snacks", 40, 275),
    ("Gum", "Snacks", 60, 125),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./balcao.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Balcao POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./balcao.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Balcao POS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let ledger = Ledger::new(StoreConfig::new(&db_path)).await?;
    println!("✓ Connected, schema ready");

    let existing = ledger.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    let products = ledger.products();
    let now = Utc::now();
    let mut seeded = 0;

    for &(name, category, quantity, price_cents) in SAMPLE_PRODUCTS {
        let product = Product {
            name: name.to_string(),
            quantity,
            price: Money::from_cents(price_cents),
            category: category.to_string(),
            barcode: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = products.insert(&product).await {
            eprintln!("Failed to insert {}: {}", name, e);
            continue;
        }
        seeded += 1;
    }

    println!("✓ Seeded {} products", seeded);

    let low = products.list_below(20).await?;
    println!("  Low-stock report (<= 20 on hand): {} products", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
