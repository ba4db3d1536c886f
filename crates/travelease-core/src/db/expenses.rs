//! Expense operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::expenses::canonical_category;
use crate::models::{Expense, ExpenseSummary, NewExpense};

const EXPENSE_COLUMNS: &str = "id, trip_id, date, amount, category, remarks, created_at";

fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let date: String = row.get(2)?;
    let created_at: String = row.get(6)?;
    Ok(Expense {
        id: row.get(0)?,
        trip_id: row.get(1)?,
        date: parse_date(&date)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        remarks: row.get(5)?,
        created_at: parse_datetime(&created_at),
    })
}

fn validate_expense(expense: &NewExpense) -> Result<String> {
    if !expense.amount.is_finite() || expense.amount < 0.0 {
        return Err(Error::InvalidData(format!(
            "Invalid amount: {}",
            expense.amount
        )));
    }
    canonical_category(&expense.category)
}

impl Database {
    /// Record an expense against a trip
    pub fn create_expense(&self, trip_id: i64, expense: &NewExpense) -> Result<i64> {
        let category = validate_expense(expense)?;
        self.get_trip(trip_id)?
            .ok_or_else(|| Error::NotFound("Trip not found".to_string()))?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO expenses (trip_id, date, amount, category, remarks) VALUES (?, ?, ?, ?, ?)",
            params![
                trip_id,
                expense.date.to_string(),
                expense.amount,
                category,
                expense.remarks
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get an expense by ID
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
            params![id],
            row_to_expense,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List a trip's expenses by date
    pub fn list_expenses(&self, trip_id: i64) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE trip_id = ? ORDER BY date, id",
            EXPENSE_COLUMNS
        ))?;
        let expenses = stmt
            .query_map(params![trip_id], row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }

    /// Replace an expense's fields
    pub fn update_expense(&self, id: i64, expense: &NewExpense) -> Result<Expense> {
        let category = validate_expense(expense)?;

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE expenses SET date = ?, amount = ?, category = ?, remarks = ? WHERE id = ?",
            params![
                expense.date.to_string(),
                expense.amount,
                category,
                expense.remarks,
                id
            ],
        )?;
        drop(conn);

        if updated == 0 {
            return Err(Error::NotFound("Expense not found".to_string()));
        }
        self.get_expense(id)?
            .ok_or_else(|| Error::NotFound("Expense not found".to_string()))
    }

    /// Delete an expense; false when it did not exist
    pub fn delete_expense(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM expenses WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// Totals, balance and per-category breakdown for a trip
    pub fn get_expense_summary(&self, trip_id: i64) -> Result<ExpenseSummary> {
        let trip = self
            .get_trip(trip_id)?
            .ok_or_else(|| Error::NotFound("Trip not found".to_string()))?;
        let expenses = self.list_expenses(trip_id)?;
        Ok(ExpenseSummary::from_expenses(trip.budget, &expenses))
    }
}
