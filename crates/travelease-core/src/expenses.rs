//! Expense categories, amount parsing and aggregation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Expense, ExpenseSummary};

/// Well-known expense categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Fnb,
    Transportation,
    Accommodation,
    Activities,
    Shopping,
    Others,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        Self::Fnb,
        Self::Transportation,
        Self::Accommodation,
        Self::Activities,
        Self::Shopping,
        Self::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fnb => "fnb",
            Self::Transportation => "transportation",
            Self::Accommodation => "accommodation",
            Self::Activities => "activities",
            Self::Shopping => "shopping",
            Self::Others => "others",
        }
    }

    /// Human-readable label for charts
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fnb => "Food & Beverage",
            Self::Transportation => "Transportation",
            Self::Accommodation => "Accommodation",
            Self::Activities => "Activities",
            Self::Shopping => "Shopping",
            Self::Others => "Others",
        }
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fnb" | "f&b" | "food" => Ok(Self::Fnb),
            "transportation" | "transport" => Ok(Self::Transportation),
            "accommodation" => Ok(Self::Accommodation),
            "activities" | "activity" => Ok(Self::Activities),
            "shopping" => Ok(Self::Shopping),
            "others" | "other" => Ok(Self::Others),
            _ => Err(format!("Unknown expense category: {}", s)),
        }
    }
}

/// Canonical storage/grouping key for a category
///
/// Comparison is case-insensitive, so "FnB" and "fnb" share a bucket. Unknown
/// categories are kept (trimmed and lowercased) instead of being discarded.
pub fn canonical_category(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidData("Expense category is required".to_string()));
    }
    Ok(trimmed
        .parse::<ExpenseCategory>()
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|_| trimmed.to_lowercase()))
}

/// Parse an amount entered as text ("100", " 12.50 ")
pub fn parse_amount(raw: &str) -> Result<f64> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidData(format!("Invalid amount: {}", raw)))?;
    if !amount.is_finite() {
        return Err(Error::InvalidData(format!("Invalid amount: {}", raw)));
    }
    Ok(amount)
}

/// Amount as sent by clients: a JSON number or a numeric string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn to_amount(&self) -> Result<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Ok(*n),
            Self::Number(n) => Err(Error::InvalidData(format!("Invalid amount: {}", n))),
            Self::Text(s) => parse_amount(s),
        }
    }
}

/// Sum of all expense amounts
pub fn total_spent(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Totals per canonical category
pub fn totals_by_category(expenses: &[Expense]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for expense in expenses {
        let key = canonical_category(&expense.category)
            .unwrap_or_else(|_| ExpenseCategory::Others.as_str().to_string());
        *totals.entry(key).or_insert(0.0) += expense.amount;
    }
    totals
}

/// Remaining budget after spending
pub fn balance(budget: Option<f64>, total_spent: f64) -> f64 {
    budget.unwrap_or(0.0) - total_spent
}

impl ExpenseSummary {
    /// Fold a trip's expenses into totals
    pub fn from_expenses(budget: Option<f64>, expenses: &[Expense]) -> Self {
        let total = total_spent(expenses);
        Self {
            budget,
            total_spent: total,
            balance: balance(budget, total),
            by_category: totals_by_category(expenses),
            expense_count: expenses.len(),
        }
    }
}
