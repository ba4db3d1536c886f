//! Itinerary planning: day labels, day reconciliation and the read model
//!
//! Days are stored by calendar date. "Day N" labels only exist at the edges:
//! incoming labels are turned into dates (`start + N - 1`) and stored dates
//! are turned back into labels when the itinerary is read.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Itinerary, ItineraryDay, ItineraryPlace, MapMarker, PlaceInput, Trip};
use crate::revalidate::{itinerary_path, PathRevalidator};

/// Parse a day label ("Day 3", "day 3" or "3") into its 1-based day number
pub fn parse_day_label(label: &str) -> Result<i64> {
    let trimmed = label.trim();
    let number = match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("day") => trimmed[3..].trim(),
        _ => trimmed,
    };

    match number.parse::<i64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(Error::InvalidData(format!("Invalid day label: {}", label))),
    }
}

/// Label for a 1-based day number
pub fn day_label(day_number: i64) -> String {
    format!("Day {}", day_number)
}

/// Calendar date of a 1-based day number
///
/// Day numbers that land past the last representable date are rejected.
pub fn date_for_day(start_date: NaiveDate, day_number: i64) -> Result<NaiveDate> {
    day_number
        .checked_sub(1)
        .and_then(|offset| u64::try_from(offset).ok())
        .and_then(|offset| start_date.checked_add_days(Days::new(offset)))
        .ok_or_else(|| Error::InvalidData(format!("Invalid day label: Day {}", day_number)))
}

/// 1-based day number of a calendar date
pub fn day_number_for_date(start_date: NaiveDate, date: NaiveDate) -> i64 {
    (date - start_date).num_days() + 1
}

/// Markers for places with a valid, non-zero coordinate
pub fn markers_for(places: &[ItineraryPlace]) -> Vec<MapMarker> {
    places
        .iter()
        .filter_map(|place| {
            let coordinate = place
                .coordinate
                .parse::<crate::models::Coordinate>()
                .ok()?;
            if coordinate.is_default() || !coordinate.is_valid() {
                return None;
            }
            Some(MapMarker {
                name: place.name.clone(),
                lat: coordinate.lat,
                lng: coordinate.lng,
            })
        })
        .collect()
}

/// Group stored (date, place) rows into the per-day read model
///
/// Rows must already be in display order within each date. Every day in
/// `[start, end]` is present, with empty lists when nothing is planned.
/// Dates outside that range keep their computed label.
pub fn build_itinerary(trip: &Trip, rows: Vec<(NaiveDate, Option<ItineraryPlace>)>) -> Itinerary {
    let mut by_date: BTreeMap<NaiveDate, Vec<ItineraryPlace>> = BTreeMap::new();

    let mut next = Some(trip.start_date);
    while let Some(date) = next.filter(|d| *d <= trip.end_date) {
        by_date.insert(date, Vec::new());
        next = date.succ_opt();
    }

    for (date, place) in rows {
        let places = by_date.entry(date).or_default();
        if let Some(place) = place {
            places.push(place);
        }
    }

    let days = by_date
        .into_iter()
        .map(|(date, places)| {
            let day_number = day_number_for_date(trip.start_date, date);
            ItineraryDay {
                label: day_label(day_number),
                day_number,
                date,
                markers: markers_for(&places),
                places,
            }
        })
        .collect();

    Itinerary {
        trip_id: trip.id,
        start_date: trip.start_date,
        end_date: trip.end_date,
        days,
    }
}

/// Reconciles itinerary days and notifies the page cache after changes
pub struct ItineraryPlanner<'a> {
    db: &'a Database,
    revalidator: &'a dyn PathRevalidator,
}

impl<'a> ItineraryPlanner<'a> {
    pub fn new(db: &'a Database, revalidator: &'a dyn PathRevalidator) -> Self {
        Self { db, revalidator }
    }

    /// Full itinerary of a trip
    pub fn get(&self, trip_id: i64) -> Result<Itinerary> {
        self.db.get_itinerary(trip_id)
    }

    /// Replace the places of one day and return the whole recomputed itinerary
    pub fn save_day(&self, trip_id: i64, label: &str, places: &[PlaceInput]) -> Result<Itinerary> {
        let date = self.resolve_day(trip_id, label)?;
        let (day_id, linked) = self.db.replace_itinerary_day(trip_id, date, places)?;

        info!(
            trip_id,
            day = label,
            %date,
            day_id,
            places = linked,
            "Saved itinerary day"
        );

        self.revalidator.revalidate(&itinerary_path(trip_id));
        self.db.get_itinerary(trip_id)
    }

    /// Reorder a day's places; same end state as saving the new order
    pub fn reorder_day(
        &self,
        trip_id: i64,
        label: &str,
        places: &[PlaceInput],
    ) -> Result<Itinerary> {
        debug!(trip_id, day = label, "Reordering itinerary day");
        self.save_day(trip_id, label, places)
    }

    /// Remove a day's places; a day with nothing stored is left as is
    pub fn delete_day(&self, trip_id: i64, label: &str) -> Result<Itinerary> {
        let date = self.resolve_day(trip_id, label)?;
        let removed = self.db.delete_itinerary_day(trip_id, date)?;

        if removed > 0 {
            info!(trip_id, day = label, %date, "Deleted itinerary day");
            self.revalidator.revalidate(&itinerary_path(trip_id));
        } else {
            debug!(trip_id, day = label, %date, "No itinerary day to delete");
        }

        self.db.get_itinerary(trip_id)
    }

    fn resolve_day(&self, trip_id: i64, label: &str) -> Result<NaiveDate> {
        let trip = self
            .db
            .get_trip(trip_id)?
            .ok_or_else(|| Error::NotFound("Trip not found".to_string()))?;
        let day_number = parse_day_label(label)?;
        date_for_day(trip.start_date, day_number)
    }
}
