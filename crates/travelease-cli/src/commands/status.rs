//! Status command implementation

use std::path::Path;

use anyhow::Result;
use travelease_core::db::{Database, DB_KEY_ENV};

use super::{open_db, truncate};

fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        format!("{:.1} KB", kb)
    } else {
        format!("{:.1} MB", kb / 1024.0)
    }
}

fn print_contents(db: &Database) -> Result<()> {
    println!();
    for (table, count) in db.table_counts()? {
        println!("   {:24} {}", table, count);
    }

    let today = chrono::Local::now().date_naive();
    let upcoming: Vec<_> = db
        .list_trips(None)?
        .into_iter()
        .filter(|t| t.end_date >= today)
        .collect();

    if !upcoming.is_empty() {
        println!();
        println!("   Upcoming trips:");
        for trip in upcoming.iter().take(5) {
            println!(
                "      {:>4}  {:24} {} → {}",
                trip.id,
                truncate(&trip.name, 24),
                trip.start_date,
                trip.end_date
            );
        }
    }
    Ok(())
}

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!();
    println!("📊 TravelEase Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Database: {}", db_path.display());

    let exists = db_path.exists();
    match std::fs::metadata(db_path) {
        Ok(meta) if exists => println!("   Size: {}", format_size(meta.len())),
        _ => println!("   Size: (run `travelease init` first)"),
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    // Opening would create the file
    if exists {
        let opened = open_db(db_path, no_encrypt).and_then(|db| print_contents(&db));
        if let Err(e) = opened {
            println!();
            println!("   ❌ Cannot read database: {:#}", e);
            if !no_encrypt {
                println!("      Check {} or pass --no-encrypt", DB_KEY_ENV);
            }
        }
    }

    println!();
    Ok(())
}
