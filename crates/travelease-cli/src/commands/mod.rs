//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_db, parse_date) and init
//! - `bookings` - Booking listing
//! - `expenses` - Expense tracking (list, add, summary, CSV export)
//! - `itinerary` - Itinerary commands (show, set, delete)
//! - `serve` - Web server command
//! - `status` - Database status
//! - `trips` - Trip management (list, create, show, budget, delete, export)

pub mod bookings;
pub mod core;
pub mod expenses;
pub mod itinerary;
pub mod serve;
pub mod status;
pub mod trips;

// Re-export command functions for main.rs
pub use bookings::*;
pub use core::*;
pub use expenses::*;
pub use itinerary::*;
pub use serve::*;
pub use status::*;
pub use trips::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an optional amount for tables
pub fn money(amount: Option<f64>) -> String {
    amount
        .map(|a| format!("{:.2}", a))
        .unwrap_or_else(|| "-".to_string())
}
