//! Trip command implementations

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use travelease_core::db::Database;
use travelease_core::expenses::parse_amount;
use travelease_core::models::NewTrip;

use super::{money, parse_date, truncate};

/// List all trips
pub fn cmd_trips_list(db: &Database) -> Result<()> {
    let trips = db.list_trips(None)?;

    if trips.is_empty() {
        println!("No trips found. Plan one with:");
        println!("  travelease trips create <name> --start YYYY-MM-DD --end YYYY-MM-DD");
        return Ok(());
    }

    println!();
    println!("🧳 Trips");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:>4} │ {:24} │ {:10} │ {:10} │ {:>4} │ {:>10}",
        "ID", "Name", "Start", "End", "Pax", "Budget"
    );
    println!("   ─────┼──────────────────────────┼────────────┼────────────┼──────┼────────────");

    for trip in trips {
        println!(
            "   {:>4} │ {:24} │ {:10} │ {:10} │ {:>4} │ {:>10}",
            trip.id,
            truncate(&trip.name, 24),
            trip.start_date,
            trip.end_date,
            trip.tourist_count,
            money(trip.budget)
        );
    }

    Ok(())
}

/// Create a trip, returning its ID
pub fn cmd_trips_create(
    db: &Database,
    name: &str,
    start: &str,
    end: &str,
    tourists: i64,
    tag: Option<&str>,
    budget: Option<&str>,
) -> Result<i64> {
    let new_trip = NewTrip {
        name: name.trim().to_string(),
        start_date: parse_date(start, "--start")?,
        end_date: parse_date(end, "--end")?,
        tourist_count: tourists,
        tag: tag.map(String::from),
        budget: budget.map(parse_amount).transpose()?,
        owner: None,
        anonymous: true,
    };

    let id = db.create_trip(&new_trip).context("Failed to create trip")?;
    db.log_audit("cli", "create", Some("trip"), Some(id), Some(&format!("name={}", name)))?;

    println!("✅ Created trip '{}' (id: {})", new_trip.name, id);
    Ok(id)
}

/// Show one trip with its budget position
pub fn cmd_trips_show(db: &Database, id: i64) -> Result<()> {
    let trip = db
        .get_trip(id)?
        .with_context(|| format!("Trip not found: {}", id))?;
    let summary = db.get_expense_summary(id)?;
    let bookings = db.list_trip_bookings(id)?;

    println!();
    println!("🧳 {}", trip.name);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Dates:      {} → {} ({} days)",
        trip.start_date,
        trip.end_date,
        trip.duration_days()
    );
    println!("   Travellers: {}", trip.tourist_count);
    if let Some(tag) = &trip.tag {
        println!("   Tag:        {}", tag);
    }
    println!();
    println!(
        "   Bookings:   {} flights, {} stays, {} activities",
        bookings.flights.len(),
        bookings.accommodations.len(),
        bookings.activities.len()
    );
    println!("   Budget:     {}", money(summary.budget));
    println!("   Spent:      {:.2}", summary.total_spent);
    println!("   Balance:    {:.2}", summary.balance);

    Ok(())
}

/// Set or clear a trip's budget
pub fn cmd_trips_budget(db: &Database, id: i64, amount: Option<&str>) -> Result<()> {
    let budget = amount.map(parse_amount).transpose()?;
    let trip = db
        .set_trip_budget(id, budget)
        .context("Failed to update budget")?;
    db.log_audit(
        "cli",
        "update_budget",
        Some("trip"),
        Some(id),
        Some(&format!("budget={:?}", budget)),
    )?;

    match trip.budget {
        Some(b) => println!("✅ Budget for '{}' set to {:.2}", trip.name, b),
        None => println!("✅ Budget for '{}' cleared", trip.name),
    }
    Ok(())
}

/// Delete a trip and everything attached to it
pub fn cmd_trips_delete(db: &Database, id: i64) -> Result<()> {
    if !db.delete_trip(id)? {
        anyhow::bail!("Trip not found: {}", id);
    }
    db.log_audit("cli", "delete", Some("trip"), Some(id), None)?;

    println!("🗑️  Deleted trip {}", id);
    Ok(())
}

/// Export a trip as pretty JSON to a file or stdout
pub fn cmd_trips_export(db: &Database, id: i64, output: Option<&Path>) -> Result<()> {
    let export = db.export_trip(id).context("Failed to export trip")?;
    let json = serde_json::to_string_pretty(&export)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ Exported trip {} to {}", id, path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    db.log_audit("cli", "export_trip", Some("trip"), Some(id), None)?;
    Ok(())
}
