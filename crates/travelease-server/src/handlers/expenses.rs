//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use super::trips::{parse_date, require_trip};
use crate::{double_option, get_user, read_json, AppError, AppState, Envelope, OrFailed};
use travelease_core::models::{Expense, ExpenseSummary, NewExpense};
use travelease_core::revalidate::expenses_path;
use travelease_core::AmountInput;

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub date: String,
    pub amount: AmountInput,
    pub category: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub date: Option<String>,
    pub amount: Option<AmountInput>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub remarks: Option<Option<String>>,
}

/// GET /api/trips/:id/expenses - List a trip's expenses by date
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Vec<Expense>>, AppError> {
    let user = get_user(&headers);
    require_trip(&state, trip_id)?;

    let expenses = state.db.list_expenses(trip_id)?;

    state.db.log_audit(
        &user,
        "list",
        Some("expenses"),
        Some(trip_id),
        Some(&format!("count={}", expenses.len())),
    )?;

    Ok(Json(expenses))
}

/// POST /api/trips/:id/expenses - Record an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    request: Request,
) -> Result<Json<Envelope<Expense>>, AppError> {
    let user = get_user(request.headers());
    let action = "create expense";

    let body: CreateExpenseRequest = read_json(request).await.or_failed(action)?;
    let expense = NewExpense {
        date: parse_date(&body.date, "date").or_failed(action)?,
        amount: body.amount.to_amount().or_failed(action)?,
        category: body.category,
        remarks: body.remarks,
    };

    let id = state.db.create_expense(trip_id, &expense).or_failed(action)?;
    let expense = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::internal("Failed to fetch created expense"))?;

    state.db.log_audit(
        &user,
        "create",
        Some("expense"),
        Some(id),
        Some(&format!(
            "category={}, amount={:.2}",
            expense.category, expense.amount
        )),
    )?;
    state.revalidator.revalidate(&expenses_path(trip_id));

    Ok(Envelope::success("Expense added", expense))
}

/// GET /api/expenses/:id - Get a single expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Expense>, AppError> {
    let user = get_user(&headers);

    let expense = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    state
        .db
        .log_audit(&user, "read", Some("expense"), Some(id), None)?;

    Ok(Json(expense))
}

/// PATCH /api/expenses/:id - Update some fields of an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Envelope<Expense>>, AppError> {
    let user = get_user(request.headers());
    let action = "update expense";

    let body: UpdateExpenseRequest = read_json(request).await.or_failed(action)?;
    let current = state
        .db
        .get_expense(id)
        .or_failed(action)?
        .ok_or_else(|| AppError::not_found("Expense not found").failed(action))?;

    let merged = NewExpense {
        date: match body.date {
            Some(d) => parse_date(&d, "date").or_failed(action)?,
            None => current.date,
        },
        amount: match body.amount {
            Some(a) => a.to_amount().or_failed(action)?,
            None => current.amount,
        },
        category: body.category.unwrap_or(current.category),
        remarks: body.remarks.unwrap_or(current.remarks),
    };

    let expense = state.db.update_expense(id, &merged).or_failed(action)?;

    state
        .db
        .log_audit(&user, "update", Some("expense"), Some(id), None)?;
    state.revalidator.revalidate(&expenses_path(expense.trip_id));

    Ok(Envelope::success("Expense updated", expense))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Envelope<()>>, AppError> {
    let user = get_user(&headers);
    let action = "delete expense";

    let expense = state
        .db
        .get_expense(id)
        .or_failed(action)?
        .ok_or_else(|| AppError::not_found("Expense not found").failed(action))?;
    state.db.delete_expense(id).or_failed(action)?;

    state
        .db
        .log_audit(&user, "delete", Some("expense"), Some(id), None)?;
    state.revalidator.revalidate(&expenses_path(expense.trip_id));

    Ok(Envelope::done("Expense deleted"))
}

/// GET /api/trips/:id/expenses/summary - Totals, balance and category breakdown
pub async fn get_expense_summary(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ExpenseSummary>, AppError> {
    let user = get_user(&headers);

    let summary = state.db.get_expense_summary(trip_id)?;

    state
        .db
        .log_audit(&user, "summary", Some("expenses"), Some(trip_id), None)?;

    Ok(Json(summary))
}
