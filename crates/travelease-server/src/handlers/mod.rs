//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod audit;
pub mod auth;
pub mod bookings;
pub mod expenses;
pub mod export;
pub mod itinerary;
pub mod locations;
pub mod trips;

// Re-export all handlers for use in router
pub use audit::*;
pub use auth::*;
pub use bookings::*;
pub use expenses::*;
pub use export::*;
pub use itinerary::*;
pub use locations::*;
pub use trips::*;
