//! Flight, accommodation and activity bookings
//!
//! The three booking kinds live in separate tables. Accommodation and
//! activity bookings point at a shared location, resolved by name in the
//! same transaction that writes the booking.

use chrono::{NaiveDateTime, NaiveTime};
use rusqlite::{params, OptionalExtension, Row};

use super::locations::resolve_location_with;
use super::{parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{
    AccommodationBooking, AccommodationDetails, ActivityBooking, ActivityDetails, FlightBooking,
    FlightDetails, TripBookings,
};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M";

fn format_datetime(dt: Option<NaiveDateTime>) -> Option<String> {
    dt.map(|d| d.format(DATETIME_FORMAT).to_string())
}

fn parse_opt_datetime(s: Option<String>) -> Option<NaiveDateTime> {
    s.and_then(|s| NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT).ok())
}

fn format_time(t: Option<NaiveTime>) -> Option<String> {
    t.map(|t| t.format(TIME_FORMAT).to_string())
}

fn parse_opt_time(s: Option<String>) -> Option<NaiveTime> {
    s.and_then(|s| NaiveTime::parse_from_str(&s, TIME_FORMAT).ok())
}

fn validate_price(price: Option<f64>) -> Result<()> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => {
            Err(Error::InvalidData(format!("Invalid price: {}", p)))
        }
        _ => Ok(()),
    }
}

fn validate_flight(details: &FlightDetails) -> Result<()> {
    if details.airline.trim().is_empty() || details.flight_number.trim().is_empty() {
        return Err(Error::InvalidData(
            "Airline and flight number are required".to_string(),
        ));
    }
    if let (Some(dep), Some(arr)) = (details.departure_time, details.arrival_time) {
        if arr < dep {
            return Err(Error::InvalidData(
                "Arrival time must not be before departure time".to_string(),
            ));
        }
    }
    validate_price(details.price)
}

fn validate_accommodation(details: &AccommodationDetails) -> Result<()> {
    if details.name.trim().is_empty() {
        return Err(Error::InvalidData("Accommodation name is required".to_string()));
    }
    if details.check_out < details.check_in {
        return Err(Error::InvalidData(
            "Check-out must not be before check-in".to_string(),
        ));
    }
    validate_price(details.price)
}

fn validate_activity(details: &ActivityDetails) -> Result<()> {
    if details.name.trim().is_empty() {
        return Err(Error::InvalidData("Activity name is required".to_string()));
    }
    validate_price(details.price)
}

fn row_to_flight(row: &Row<'_>) -> rusqlite::Result<FlightBooking> {
    let created_at: String = row.get(10)?;
    Ok(FlightBooking {
        id: row.get(0)?,
        trip_id: row.get(1)?,
        details: FlightDetails {
            airline: row.get(2)?,
            flight_number: row.get(3)?,
            departure_airport: row.get(4)?,
            arrival_airport: row.get(5)?,
            departure_time: parse_opt_datetime(row.get(6)?),
            arrival_time: parse_opt_datetime(row.get(7)?),
            booking_reference: row.get(8)?,
            price: row.get(9)?,
        },
        created_at: parse_datetime(&created_at),
    })
}

fn row_to_accommodation(row: &Row<'_>) -> rusqlite::Result<AccommodationBooking> {
    let check_in: String = row.get(5)?;
    let check_out: String = row.get(6)?;
    let created_at: String = row.get(9)?;
    Ok(AccommodationBooking {
        id: row.get(0)?,
        trip_id: row.get(1)?,
        location_id: row.get(2)?,
        location_name: row.get(3)?,
        name: row.get(4)?,
        check_in: parse_date(&check_in)?,
        check_out: parse_date(&check_out)?,
        booking_reference: row.get(7)?,
        price: row.get(8)?,
        created_at: parse_datetime(&created_at),
    })
}

fn row_to_activity(row: &Row<'_>) -> rusqlite::Result<ActivityBooking> {
    let date: String = row.get(5)?;
    let created_at: String = row.get(10)?;
    Ok(ActivityBooking {
        id: row.get(0)?,
        trip_id: row.get(1)?,
        location_id: row.get(2)?,
        location_name: row.get(3)?,
        name: row.get(4)?,
        date: parse_date(&date)?,
        start_time: parse_opt_time(row.get(6)?),
        end_time: parse_opt_time(row.get(7)?),
        booking_reference: row.get(8)?,
        price: row.get(9)?,
        created_at: parse_datetime(&created_at),
    })
}

const FLIGHT_SELECT: &str = "SELECT id, trip_id, airline, flight_number, departure_airport, arrival_airport,
            departure_time, arrival_time, booking_reference, price, created_at
     FROM flight_bookings";

const ACCOMMODATION_SELECT: &str = "SELECT b.id, b.trip_id, b.location_id, l.name, b.name, b.check_in, b.check_out,
            b.booking_reference, b.price, b.created_at
     FROM accommodation_bookings b
     JOIN locations l ON l.id = b.location_id";

const ACTIVITY_SELECT: &str = "SELECT b.id, b.trip_id, b.location_id, l.name, b.name, b.date, b.start_time, b.end_time,
            b.booking_reference, b.price, b.created_at
     FROM activity_bookings b
     JOIN locations l ON l.id = b.location_id";

impl Database {
    fn require_trip(&self, trip_id: i64) -> Result<()> {
        self.get_trip(trip_id)?
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Trip not found".to_string()))
    }

    // ========== Flight Operations ==========

    /// Create a flight booking for a trip
    pub fn create_flight_booking(&self, trip_id: i64, details: &FlightDetails) -> Result<i64> {
        validate_flight(details)?;
        self.require_trip(trip_id)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO flight_bookings (trip_id, airline, flight_number, departure_airport, arrival_airport,
                departure_time, arrival_time, booking_reference, price)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                trip_id,
                details.airline.trim(),
                details.flight_number.trim(),
                details.departure_airport.trim(),
                details.arrival_airport.trim(),
                format_datetime(details.departure_time),
                format_datetime(details.arrival_time),
                details.booking_reference,
                details.price
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a flight booking by ID
    pub fn get_flight_booking(&self, id: i64) -> Result<Option<FlightBooking>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("{} WHERE id = ?", FLIGHT_SELECT),
            params![id],
            row_to_flight,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List a trip's flights by departure time
    pub fn list_flight_bookings(&self, trip_id: i64) -> Result<Vec<FlightBooking>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE trip_id = ? ORDER BY departure_time IS NULL, departure_time, id",
            FLIGHT_SELECT
        ))?;
        let flights = stmt
            .query_map(params![trip_id], row_to_flight)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(flights)
    }

    /// Replace a flight booking's details
    pub fn update_flight_booking(&self, id: i64, details: &FlightDetails) -> Result<FlightBooking> {
        validate_flight(details)?;

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE flight_bookings SET airline = ?, flight_number = ?, departure_airport = ?, arrival_airport = ?,
                departure_time = ?, arrival_time = ?, booking_reference = ?, price = ?
             WHERE id = ?",
            params![
                details.airline.trim(),
                details.flight_number.trim(),
                details.departure_airport.trim(),
                details.arrival_airport.trim(),
                format_datetime(details.departure_time),
                format_datetime(details.arrival_time),
                details.booking_reference,
                details.price,
                id
            ],
        )?;
        drop(conn);

        if updated == 0 {
            return Err(Error::NotFound("Flight booking not found".to_string()));
        }
        self.get_flight_booking(id)?
            .ok_or_else(|| Error::NotFound("Flight booking not found".to_string()))
    }

    /// Delete a flight booking; false when it did not exist
    pub fn delete_flight_booking(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM flight_bookings WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    // ========== Accommodation Operations ==========

    /// Create an accommodation booking, resolving its location by name
    pub fn create_accommodation_booking(
        &self,
        trip_id: i64,
        details: &AccommodationDetails,
    ) -> Result<i64> {
        validate_accommodation(details)?;
        self.require_trip(trip_id)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let location_id = resolve_location_with(&tx, &details.location.to_new_location())?;
        tx.execute(
            "INSERT INTO accommodation_bookings (trip_id, location_id, name, check_in, check_out, booking_reference, price)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                trip_id,
                location_id,
                details.name.trim(),
                details.check_in.to_string(),
                details.check_out.to_string(),
                details.booking_reference,
                details.price
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Get an accommodation booking by ID
    pub fn get_accommodation_booking(&self, id: i64) -> Result<Option<AccommodationBooking>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("{} WHERE b.id = ?", ACCOMMODATION_SELECT),
            params![id],
            row_to_accommodation,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List a trip's accommodation by check-in date
    pub fn list_accommodation_bookings(&self, trip_id: i64) -> Result<Vec<AccommodationBooking>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE b.trip_id = ? ORDER BY b.check_in, b.id",
            ACCOMMODATION_SELECT
        ))?;
        let stays = stmt
            .query_map(params![trip_id], row_to_accommodation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(stays)
    }

    /// Replace an accommodation booking's details
    pub fn update_accommodation_booking(
        &self,
        id: i64,
        details: &AccommodationDetails,
    ) -> Result<AccommodationBooking> {
        validate_accommodation(details)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let location_id = resolve_location_with(&tx, &details.location.to_new_location())?;
        let updated = tx.execute(
            "UPDATE accommodation_bookings SET location_id = ?, name = ?, check_in = ?, check_out = ?,
                booking_reference = ?, price = ?
             WHERE id = ?",
            params![
                location_id,
                details.name.trim(),
                details.check_in.to_string(),
                details.check_out.to_string(),
                details.booking_reference,
                details.price,
                id
            ],
        )?;
        if updated == 0 {
            // Dropping the transaction rolls back the location upsert too
            return Err(Error::NotFound("Accommodation booking not found".to_string()));
        }
        tx.commit()?;
        drop(conn);

        self.get_accommodation_booking(id)?
            .ok_or_else(|| Error::NotFound("Accommodation booking not found".to_string()))
    }

    /// Delete an accommodation booking; false when it did not exist
    pub fn delete_accommodation_booking(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM accommodation_bookings WHERE id = ?",
            params![id],
        )?;
        Ok(deleted > 0)
    }

    // ========== Activity Operations ==========

    /// Create an activity booking, resolving its location by name
    pub fn create_activity_booking(&self, trip_id: i64, details: &ActivityDetails) -> Result<i64> {
        validate_activity(details)?;
        self.require_trip(trip_id)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let location_id = resolve_location_with(&tx, &details.location.to_new_location())?;
        tx.execute(
            "INSERT INTO activity_bookings (trip_id, location_id, name, date, start_time, end_time, booking_reference, price)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                trip_id,
                location_id,
                details.name.trim(),
                details.date.to_string(),
                format_time(details.start_time),
                format_time(details.end_time),
                details.booking_reference,
                details.price
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Get an activity booking by ID
    pub fn get_activity_booking(&self, id: i64) -> Result<Option<ActivityBooking>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("{} WHERE b.id = ?", ACTIVITY_SELECT),
            params![id],
            row_to_activity,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List a trip's activities by date and start time
    pub fn list_activity_bookings(&self, trip_id: i64) -> Result<Vec<ActivityBooking>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE b.trip_id = ? ORDER BY b.date, b.start_time IS NULL, b.start_time, b.id",
            ACTIVITY_SELECT
        ))?;
        let activities = stmt
            .query_map(params![trip_id], row_to_activity)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(activities)
    }

    /// Replace an activity booking's details
    pub fn update_activity_booking(
        &self,
        id: i64,
        details: &ActivityDetails,
    ) -> Result<ActivityBooking> {
        validate_activity(details)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let location_id = resolve_location_with(&tx, &details.location.to_new_location())?;
        let updated = tx.execute(
            "UPDATE activity_bookings SET location_id = ?, name = ?, date = ?, start_time = ?, end_time = ?,
                booking_reference = ?, price = ?
             WHERE id = ?",
            params![
                location_id,
                details.name.trim(),
                details.date.to_string(),
                format_time(details.start_time),
                format_time(details.end_time),
                details.booking_reference,
                details.price,
                id
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("Activity booking not found".to_string()));
        }
        tx.commit()?;
        drop(conn);

        self.get_activity_booking(id)?
            .ok_or_else(|| Error::NotFound("Activity booking not found".to_string()))
    }

    /// Delete an activity booking; false when it did not exist
    pub fn delete_activity_booking(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM activity_bookings WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// All bookings of a trip
    pub fn list_trip_bookings(&self, trip_id: i64) -> Result<TripBookings> {
        Ok(TripBookings {
            flights: self.list_flight_bookings(trip_id)?,
            accommodations: self.list_accommodation_bookings(trip_id)?,
            activities: self.list_activity_bookings(trip_id)?,
        })
    }
}
