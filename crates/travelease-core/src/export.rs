//! Export of trip data
//!
//! Supports:
//! - Expense CSV export for spreadsheets
//! - Full trip JSON export (trip, bookings, itinerary, expenses, summary)

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Expense, ExpenseSummary, Itinerary, Trip, TripBookings};

/// Everything stored for one trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripExport {
    pub exported_at: String,
    pub trip: Trip,
    pub bookings: TripBookings,
    pub itinerary: Itinerary,
    pub expenses: Vec<Expense>,
    pub summary: ExpenseSummary,
}

#[derive(Serialize)]
struct ExpenseCsvRow<'a> {
    date: String,
    category: &'a str,
    amount: String,
    remarks: &'a str,
}

/// Write expenses as CSV (`date,category,amount,remarks`)
pub fn write_expenses_csv<W: std::io::Write>(writer: W, expenses: &[Expense]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for expense in expenses {
        csv.serialize(ExpenseCsvRow {
            date: expense.date.to_string(),
            category: &expense.category,
            amount: format!("{:.2}", expense.amount),
            remarks: expense.remarks.as_deref().unwrap_or(""),
        })?;
    }
    csv.flush()?;
    Ok(())
}

impl Database {
    /// Expenses of a trip as a CSV document
    pub fn export_expenses_csv(&self, trip_id: i64) -> Result<String> {
        let expenses = self.list_expenses(trip_id)?;
        let mut buffer = Vec::new();
        write_expenses_csv(&mut buffer, &expenses)?;
        String::from_utf8(buffer).map_err(|e| Error::InvalidData(e.to_string()))
    }

    /// Full snapshot of one trip
    pub fn export_trip(&self, trip_id: i64) -> Result<TripExport> {
        let trip = self
            .get_trip(trip_id)?
            .ok_or_else(|| Error::NotFound("Trip not found".to_string()))?;
        let expenses = self.list_expenses(trip_id)?;
        let summary = ExpenseSummary::from_expenses(trip.budget, &expenses);

        Ok(TripExport {
            exported_at: Utc::now().to_rfc3339(),
            bookings: self.list_trip_bookings(trip_id)?,
            itinerary: self.get_itinerary(trip_id)?,
            trip,
            expenses,
            summary,
        })
    }
}
