//! Itinerary command implementations

use anyhow::{Context, Result};
use travelease_core::db::Database;
use travelease_core::models::{Itinerary, PlaceInput};
use travelease_core::{ItineraryPlanner, LogRevalidator};

fn print_itinerary(itinerary: &Itinerary) {
    println!();
    println!(
        "🗺️  Itinerary ({} → {})",
        itinerary.start_date, itinerary.end_date
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for day in &itinerary.days {
        println!("   {} ({})", day.label, day.date);
        if day.places.is_empty() {
            println!("      -");
        }
        for (i, place) in day.places.iter().enumerate() {
            let pin = if day.markers.iter().any(|m| m.name == place.name) {
                "📍"
            } else {
                "  "
            };
            println!("      {}. {} {}", i + 1, pin, place.name);
        }
    }
}

/// Show every day of a trip
pub fn cmd_itinerary_show(db: &Database, trip_id: i64) -> Result<()> {
    db.get_trip(trip_id)?
        .with_context(|| format!("Trip not found: {}", trip_id))?;

    let revalidator = LogRevalidator;
    let itinerary = ItineraryPlanner::new(db, &revalidator).get(trip_id)?;
    print_itinerary(&itinerary);
    Ok(())
}

/// Replace one day's places
pub fn cmd_itinerary_set(db: &Database, trip_id: i64, day: &str, places: &[String]) -> Result<()> {
    let places: Vec<PlaceInput> = places.iter().map(|p| PlaceInput::from(p.as_str())).collect();

    let revalidator = LogRevalidator;
    let itinerary = ItineraryPlanner::new(db, &revalidator)
        .save_day(trip_id, day, &places)
        .with_context(|| format!("Failed to save {}", day))?;
    db.log_audit(
        "cli",
        "save_day",
        Some("itinerary"),
        Some(trip_id),
        Some(&format!("day={}, places={}", day, places.len())),
    )?;

    println!("✅ Saved {}", day);
    print_itinerary(&itinerary);
    Ok(())
}

/// Clear one day
pub fn cmd_itinerary_delete(db: &Database, trip_id: i64, day: &str) -> Result<()> {
    let revalidator = LogRevalidator;
    ItineraryPlanner::new(db, &revalidator)
        .delete_day(trip_id, day)
        .with_context(|| format!("Failed to delete {}", day))?;
    db.log_audit(
        "cli",
        "delete_day",
        Some("itinerary"),
        Some(trip_id),
        Some(&format!("day={}", day)),
    )?;

    println!("🗑️  Cleared {}", day);
    Ok(())
}
