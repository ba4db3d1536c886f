//! Route revalidation after mutations
//!
//! Page caches in front of the API are keyed by route path. After a
//! successful mutation the affected paths are handed to a [`PathRevalidator`];
//! the call is fire-and-forget and never fails the mutation.

use std::sync::Mutex;

use tracing::info;

/// Invalidates cached pages for a route path
pub trait PathRevalidator: Send + Sync {
    fn revalidate(&self, path: &str);
}

/// Revalidator that only records the request in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRevalidator;

impl PathRevalidator for LogRevalidator {
    fn revalidate(&self, path: &str) {
        info!(path, "Revalidating route");
    }
}

/// Revalidator that remembers every path it was asked to invalidate
#[derive(Debug, Default)]
pub struct RecordingRevalidator {
    paths: Mutex<Vec<String>>,
}

impl RecordingRevalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths revalidated so far, oldest first
    pub fn paths(&self) -> Vec<String> {
        self.paths
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl PathRevalidator for RecordingRevalidator {
    fn revalidate(&self, path: &str) {
        if let Ok(mut paths) = self.paths.lock() {
            paths.push(path.to_string());
        }
    }
}

/// Route of a trip overview page
pub fn trip_path(trip_id: i64) -> String {
    format!("/trips/{}", trip_id)
}

/// Route of a trip's itinerary page
pub fn itinerary_path(trip_id: i64) -> String {
    format!("/trips/{}/itinerary", trip_id)
}

/// Route of a trip's bookings page
pub fn bookings_path(trip_id: i64) -> String {
    format!("/trips/{}/bookings", trip_id)
}

/// Route of a trip's expenses page
pub fn expenses_path(trip_id: i64) -> String {
    format!("/trips/{}/expenses", trip_id)
}
