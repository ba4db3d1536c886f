//! Trip operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewTrip, Trip, TripUpdate};

const TRIP_COLUMNS: &str =
    "id, name, start_date, end_date, tourist_count, tag, budget, owner, anonymous, created_at";

fn validate_trip(
    name: &str,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    tourists: i64,
    budget: Option<f64>,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidData("Trip name is required".to_string()));
    }
    if end < start {
        return Err(Error::InvalidData(
            "Trip end date must not be before its start date".to_string(),
        ));
    }
    if (end - start).num_days() + 1 > Trip::MAX_DAYS {
        return Err(Error::InvalidData(format!(
            "Trip cannot be longer than {} days",
            Trip::MAX_DAYS
        )));
    }
    if tourists < 1 {
        return Err(Error::InvalidData(
            "Tourist count must be at least 1".to_string(),
        ));
    }
    if let Some(b) = budget {
        if !b.is_finite() || b < 0.0 {
            return Err(Error::InvalidData(format!("Invalid budget: {}", b)));
        }
    }
    Ok(())
}

impl Database {
    pub(crate) fn row_to_trip(row: &Row<'_>) -> rusqlite::Result<Trip> {
        let start: String = row.get(2)?;
        let end: String = row.get(3)?;
        let created_at: String = row.get(9)?;
        Ok(Trip {
            id: row.get(0)?,
            name: row.get(1)?,
            start_date: parse_date(&start)?,
            end_date: parse_date(&end)?,
            tourist_count: row.get(4)?,
            tag: row.get(5)?,
            budget: row.get(6)?,
            owner: row.get(7)?,
            anonymous: row.get(8)?,
            created_at: parse_datetime(&created_at),
        })
    }

    /// Create a new trip
    pub fn create_trip(&self, trip: &NewTrip) -> Result<i64> {
        validate_trip(
            &trip.name,
            trip.start_date,
            trip.end_date,
            trip.tourist_count,
            trip.budget,
        )?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO trips (name, start_date, end_date, tourist_count, tag, budget, owner, anonymous)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                trip.name.trim(),
                trip.start_date.to_string(),
                trip.end_date.to_string(),
                trip.tourist_count,
                trip.tag,
                trip.budget,
                trip.owner,
                trip.anonymous
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a trip by ID
    pub fn get_trip(&self, id: i64) -> Result<Option<Trip>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM trips WHERE id = ?", TRIP_COLUMNS),
            params![id],
            Self::row_to_trip,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List trips, newest start date first, optionally only those of one owner
    pub fn list_trips(&self, owner: Option<&str>) -> Result<Vec<Trip>> {
        let conn = self.conn()?;

        let trips = match owner {
            Some(owner) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM trips WHERE owner = ? ORDER BY start_date DESC, id DESC",
                    TRIP_COLUMNS
                ))?;
                let rows = stmt.query_map(params![owner], Self::row_to_trip)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM trips ORDER BY start_date DESC, id DESC",
                    TRIP_COLUMNS
                ))?;
                let rows = stmt.query_map([], Self::row_to_trip)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        Ok(trips)
    }

    /// Apply a partial update; returns `NotFound` for a missing trip
    pub fn update_trip(&self, id: i64, update: &TripUpdate) -> Result<Trip> {
        let current = self
            .get_trip(id)?
            .ok_or_else(|| Error::NotFound("Trip not found".to_string()))?;

        let name = update.name.clone().unwrap_or(current.name);
        let start_date = update.start_date.unwrap_or(current.start_date);
        let end_date = update.end_date.unwrap_or(current.end_date);
        let tourist_count = update.tourist_count.unwrap_or(current.tourist_count);
        let tag = update.tag.clone().unwrap_or(current.tag);
        let budget = update.budget.unwrap_or(current.budget);

        validate_trip(&name, start_date, end_date, tourist_count, budget)?;

        let conn = self.conn()?;
        conn.execute(
            "UPDATE trips SET name = ?, start_date = ?, end_date = ?, tourist_count = ?, tag = ?, budget = ?
             WHERE id = ?",
            params![
                name.trim(),
                start_date.to_string(),
                end_date.to_string(),
                tourist_count,
                tag,
                budget,
                id
            ],
        )?;
        drop(conn);

        self.get_trip(id)?
            .ok_or_else(|| Error::NotFound("Trip not found".to_string()))
    }

    /// Set or clear a trip's budget
    pub fn set_trip_budget(&self, id: i64, budget: Option<f64>) -> Result<Trip> {
        self.update_trip(
            id,
            &TripUpdate {
                budget: Some(budget),
                ..Default::default()
            },
        )
    }

    /// Delete a trip; bookings, itinerary and expenses go with it
    ///
    /// Returns false when no trip had this ID.
    pub fn delete_trip(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM trips WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
