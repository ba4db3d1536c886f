//! Location resolver and lookups
//!
//! Locations are shared by name across itinerary days and bookings. The name
//! is unique at the storage layer, and resolution is a single upsert so that
//! two callers resolving the same new name end up with one row.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Location, NewLocation, DEFAULT_COORDINATE};

const LOCATION_COLUMNS: &str = "id, name, coordinate, place_id, formatted_address, created_at";

fn row_to_location(row: &Row<'_>) -> rusqlite::Result<Location> {
    let created_at: String = row.get(5)?;
    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        coordinate: row.get(2)?,
        place_id: row.get(3)?,
        formatted_address: row.get(4)?,
        created_at: parse_datetime(&created_at),
    })
}

/// Find-or-create a location on an existing connection (or transaction)
///
/// - absent name: inserted, coordinate defaulting to "0,0"
/// - present name with a new non-default coordinate: coordinate, place id and
///   address are overwritten (last write wins)
/// - present name otherwise: left untouched
pub(crate) fn resolve_location_with(conn: &Connection, location: &NewLocation) -> Result<i64> {
    let name = location.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidData("Location name is required".to_string()));
    }

    let coordinate = location
        .coordinate
        .filter(|c| !c.is_default() && c.is_valid())
        .map(|c| c.to_string());

    let id = conn
        .query_row(
            r#"
            INSERT INTO locations (name, coordinate, place_id, formatted_address)
            VALUES (?1, COALESCE(?2, ?5), ?3, ?4)
            ON CONFLICT(name) DO UPDATE SET
                coordinate = excluded.coordinate,
                place_id = excluded.place_id,
                formatted_address = excluded.formatted_address
            WHERE ?2 IS NOT NULL
            RETURNING id
            "#,
            params![
                name,
                coordinate,
                location.place_id,
                location.formatted_address,
                DEFAULT_COORDINATE
            ],
            |row| row.get::<_, i64>(0),
        )
        .optional()
        .map_err(|e| Error::Location(format!("{:?}: {}", location, e)))?;

    // The conditional DO UPDATE returns no row when the existing one is kept
    let id = match id {
        Some(id) => id,
        None => conn.query_row(
            "SELECT id FROM locations WHERE name = ?",
            params![name],
            |row| row.get(0),
        )?,
    };

    debug!(name, id, updated = coordinate.is_some(), "Resolved location");
    Ok(id)
}

impl Database {
    /// Find-or-create a location by exact name, returning its ID
    pub fn resolve_location(&self, location: &NewLocation) -> Result<i64> {
        let conn = self.conn()?;
        resolve_location_with(&conn, location)
    }

    /// Get a location by ID
    pub fn get_location(&self, id: i64) -> Result<Option<Location>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM locations WHERE id = ?", LOCATION_COLUMNS),
            params![id],
            row_to_location,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Get a location by its exact name
    pub fn find_location_by_name(&self, name: &str) -> Result<Option<Location>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM locations WHERE name = ?", LOCATION_COLUMNS),
            params![name],
            row_to_location,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List all locations by name
    pub fn list_locations(&self) -> Result<Vec<Location>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM locations ORDER BY name",
            LOCATION_COLUMNS
        ))?;

        let locations = stmt
            .query_map([], row_to_location)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(locations)
    }
}
