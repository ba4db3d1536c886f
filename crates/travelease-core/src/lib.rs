//! TravelEase Core Library
//!
//! Shared functionality for the TravelEase trip planner:
//! - Database access and migrations
//! - Location resolution (find-or-create by name)
//! - Itinerary day reconciliation and the per-day itinerary view
//! - Expense categories and aggregation
//! - Route revalidation hook for page caches
//! - CSV/JSON export

pub mod db;
pub mod error;
pub mod expenses;
pub mod export;
pub mod itinerary;
pub mod models;
pub mod revalidate;

pub use db::Database;
pub use error::{Error, Result};
pub use expenses::{AmountInput, ExpenseCategory};
pub use export::TripExport;
pub use itinerary::ItineraryPlanner;
pub use revalidate::{LogRevalidator, PathRevalidator, RecordingRevalidator};
