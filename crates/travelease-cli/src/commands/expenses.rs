//! Expense command implementations

use std::path::Path;

use anyhow::{Context, Result};
use travelease_core::db::Database;
use travelease_core::expenses::parse_amount;
use travelease_core::models::NewExpense;
use travelease_core::ExpenseCategory;

use super::{money, parse_date, truncate};

/// Display label for a stored category key
fn category_label(key: &str) -> String {
    key.parse::<ExpenseCategory>()
        .map(|c| c.label().to_string())
        .unwrap_or_else(|_| key.to_string())
}

/// List a trip's expenses
pub fn cmd_expenses_list(db: &Database, trip_id: i64) -> Result<()> {
    db.get_trip(trip_id)?
        .with_context(|| format!("Trip not found: {}", trip_id))?;
    let expenses = db.list_expenses(trip_id)?;

    if expenses.is_empty() {
        println!("No expenses recorded. Add one with:");
        println!("  travelease expenses add {} <amount> --category fnb", trip_id);
        return Ok(());
    }

    println!();
    println!("💸 Expenses");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:>4} │ {:10} │ {:16} │ {:>10} │ {}",
        "ID", "Date", "Category", "Amount", "Remarks"
    );
    println!("   ─────┼────────────┼──────────────────┼────────────┼─────────────");

    for expense in expenses {
        println!(
            "   {:>4} │ {:10} │ {:16} │ {:>10.2} │ {}",
            expense.id,
            expense.date,
            truncate(&category_label(&expense.category), 16),
            expense.amount,
            expense.remarks.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

/// Record an expense, returning its ID
pub fn cmd_expenses_add(
    db: &Database,
    trip_id: i64,
    amount: &str,
    category: &str,
    date: Option<&str>,
    remarks: Option<&str>,
) -> Result<i64> {
    let date = match date {
        Some(d) => parse_date(d, "--date")?,
        None => chrono::Local::now().date_naive(),
    };

    let expense = NewExpense {
        date,
        amount: parse_amount(amount)?,
        category: category.to_string(),
        remarks: remarks.map(String::from),
    };

    let id = db
        .create_expense(trip_id, &expense)
        .context("Failed to add expense")?;
    db.log_audit(
        "cli",
        "create",
        Some("expense"),
        Some(id),
        Some(&format!("category={}, amount={:.2}", category, expense.amount)),
    )?;

    println!("✅ Added expense {:.2} ({}) on {}", expense.amount, category, date);
    Ok(id)
}

/// Print totals by category and the remaining budget
pub fn cmd_expenses_summary(db: &Database, trip_id: i64) -> Result<()> {
    let summary = db
        .get_expense_summary(trip_id)
        .with_context(|| format!("Failed to summarise trip {}", trip_id))?;

    println!();
    println!("📊 Spending");
    println!("   ─────────────────────────────────────────────────────────────");

    for (category, total) in &summary.by_category {
        let share = if summary.total_spent > 0.0 {
            total / summary.total_spent * 100.0
        } else {
            0.0
        };
        println!(
            "   {:20} {:>10.2}  ({:>5.1}%)",
            category_label(category),
            total,
            share
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {:20} {:>10.2}", "Total spent", summary.total_spent);
    println!("   {:20} {:>10}", "Budget", money(summary.budget));
    println!("   {:20} {:>10.2}", "Balance", summary.balance);
    if summary.balance < 0.0 {
        println!();
        println!("   ⚠️  Over budget by {:.2}", -summary.balance);
    }

    Ok(())
}

/// Export expenses as CSV to a file or stdout
pub fn cmd_expenses_export(db: &Database, trip_id: i64, output: Option<&Path>) -> Result<()> {
    db.get_trip(trip_id)?
        .with_context(|| format!("Trip not found: {}", trip_id))?;
    let csv = db.export_expenses_csv(trip_id)?;
    let rows = csv.lines().count().saturating_sub(1);

    match output {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ Exported {} expenses to {}", rows, path.display());
        }
        None => print!("{}", csv),
    }

    Ok(())
}
