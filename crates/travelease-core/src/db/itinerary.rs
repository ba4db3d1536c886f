//! Itinerary day storage and the itinerary read path

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::{debug, warn};

use super::locations::resolve_location_with;
use super::{parse_date, Database};
use crate::error::{Error, Result};
use crate::itinerary::build_itinerary;
use crate::models::{Itinerary, ItineraryPlace, PlaceInput};

/// Delete link rows, then day rows, for one trip date. Returns day rows removed.
fn delete_day_rows(conn: &Connection, trip_id: i64, date: NaiveDate) -> Result<usize> {
    let date = date.to_string();
    conn.execute(
        "DELETE FROM itinerary_locations WHERE itinerary_day_id IN
            (SELECT id FROM itinerary_days WHERE trip_id = ? AND date = ?)",
        params![trip_id, date],
    )?;
    let removed = conn.execute(
        "DELETE FROM itinerary_days WHERE trip_id = ? AND date = ?",
        params![trip_id, date],
    )?;
    Ok(removed)
}

impl Database {
    /// Replace one day's places in a single transaction
    ///
    /// Existing links and day rows for the date are removed, a fresh day row
    /// is written, and each non-blank place is resolved and linked in order.
    /// Any failure rolls the whole day back. Returns the new day row ID and
    /// the number of places linked.
    pub fn replace_itinerary_day(
        &self,
        trip_id: i64,
        date: NaiveDate,
        places: &[PlaceInput],
    ) -> Result<(i64, usize)> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let removed = delete_day_rows(&tx, trip_id, date)?;
        debug!(trip_id, %date, removed, "Cleared itinerary day");

        tx.execute(
            "INSERT INTO itinerary_days (trip_id, date) VALUES (?, ?)",
            params![trip_id, date.to_string()],
        )?;
        let day_id = tx.last_insert_rowid();

        let mut position = 0usize;
        for place in places {
            if place.is_blank() {
                warn!(trip_id, %date, "Skipping blank itinerary place");
                continue;
            }
            let location_id = resolve_location_with(&tx, &place.to_new_location())?;
            tx.execute(
                "INSERT INTO itinerary_locations (itinerary_day_id, location_id, position) VALUES (?, ?, ?)",
                params![day_id, location_id, position as i64],
            )?;
            position += 1;
        }

        tx.commit()?;
        Ok((day_id, position))
    }

    /// Remove one day's places; returns the number of day rows removed
    pub fn delete_itinerary_day(&self, trip_id: i64, date: NaiveDate) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let removed = delete_day_rows(&tx, trip_id, date)?;
        tx.commit()?;
        Ok(removed)
    }

    /// Whole itinerary of a trip, every day of its date range included
    pub fn get_itinerary(&self, trip_id: i64) -> Result<Itinerary> {
        let trip = self
            .get_trip(trip_id)?
            .ok_or_else(|| Error::NotFound("Trip not found".to_string()))?;

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT d.date, l.id, l.name, l.coordinate, l.place_id, l.formatted_address
            FROM itinerary_days d
            LEFT JOIN itinerary_locations il ON il.itinerary_day_id = d.id
            LEFT JOIN locations l ON l.id = il.location_id
            WHERE d.trip_id = ?
            ORDER BY d.date, il.position
            "#,
        )?;

        let rows = stmt
            .query_map(params![trip_id], |row| {
                let date: String = row.get(0)?;
                let location_id: Option<i64> = row.get(1)?;
                let place = match location_id {
                    Some(location_id) => Some(ItineraryPlace {
                        location_id,
                        name: row.get(2)?,
                        coordinate: row.get(3)?,
                        place_id: row.get(4)?,
                        formatted_address: row.get(5)?,
                    }),
                    None => None,
                };
                Ok((parse_date(&date)?, place))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(build_itinerary(&trip, rows))
    }
}
