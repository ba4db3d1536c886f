//! Booking command implementations

use anyhow::{Context, Result};
use travelease_core::db::Database;

use super::{money, truncate};

/// List every booking of a trip, grouped by kind
pub fn cmd_bookings_list(db: &Database, trip_id: i64) -> Result<()> {
    let trip = db
        .get_trip(trip_id)?
        .with_context(|| format!("Trip not found: {}", trip_id))?;
    let bookings = db.list_trip_bookings(trip_id)?;

    println!();
    println!("🎫 Bookings for {}", trip.name);
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   ✈️  Flights");
    if bookings.flights.is_empty() {
        println!("      -");
    }
    for flight in &bookings.flights {
        let departs = flight
            .details
            .departure_time
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "      {:>4}  {} {} {}→{}  {}  {}",
            flight.id,
            flight.details.airline,
            flight.details.flight_number,
            flight.details.departure_airport,
            flight.details.arrival_airport,
            departs,
            money(flight.details.price)
        );
    }

    println!("   🏨 Accommodations");
    if bookings.accommodations.is_empty() {
        println!("      -");
    }
    for stay in &bookings.accommodations {
        println!(
            "      {:>4}  {} @ {}  {} → {}  {}",
            stay.id,
            truncate(&stay.name, 30),
            truncate(&stay.location_name, 30),
            stay.check_in,
            stay.check_out,
            money(stay.price)
        );
    }

    println!("   🎟️  Activities");
    if bookings.activities.is_empty() {
        println!("      -");
    }
    for activity in &bookings.activities {
        let start = activity
            .start_time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default();
        println!(
            "      {:>4}  {} @ {}  {} {}  {}",
            activity.id,
            truncate(&activity.name, 30),
            truncate(&activity.location_name, 30),
            activity.date,
            start,
            money(activity.price)
        );
    }

    Ok(())
}
