//! Domain models for TravelEase

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ========== Trip Models ==========

/// A planned trip: the unit that owns bookings, itinerary days and expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Number of travellers
    pub tourist_count: i64,
    /// Free-text label (e.g. "family", "business")
    pub tag: Option<String>,
    pub budget: Option<f64>,
    /// Identity of the user who created the trip
    pub owner: Option<String>,
    /// Created without a signed-in user
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    /// Longest trip that can be planned
    pub const MAX_DAYS: i64 = 366;

    /// Number of calendar days covered by the trip (inclusive of both ends)
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// New trip for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrip {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub tourist_count: i64,
    pub tag: Option<String>,
    pub budget: Option<f64>,
    pub owner: Option<String>,
    pub anonymous: bool,
}

/// Partial trip update. Outer `None` leaves a field untouched; for nullable
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TripUpdate {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub tourist_count: Option<i64>,
    pub tag: Option<Option<String>>,
    pub budget: Option<Option<f64>>,
}

// ========== Location Models ==========

/// Coordinate string stored for places we have no position for
pub const DEFAULT_COORDINATE: &str = "0,0";

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// The "0,0" placeholder carries no position information
    pub fn is_default(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    /// Finite and within the valid latitude/longitude ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("Invalid coordinate: {}", s))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("Invalid latitude in coordinate: {}", s))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| format!("Invalid longitude in coordinate: {}", s))?;
        Ok(Self { lat, lng })
    }
}

/// A deduplicated place shared by itinerary days and bookings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    /// Exact, case-sensitive de-duplication key
    pub name: String,
    /// Stored as "lat,lng"
    pub coordinate: String,
    /// External place identifier (e.g. a maps provider place id)
    pub place_id: Option<String>,
    pub formatted_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Location {
    /// Parsed coordinate, if the stored string is well-formed
    pub fn lat_lng(&self) -> Option<Coordinate> {
        self.coordinate.parse().ok()
    }
}

/// Input to the location resolver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub coordinate: Option<Coordinate>,
    pub place_id: Option<String>,
    pub formatted_address: Option<String>,
}

impl NewLocation {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Coordinate as sent by clients: either "lat,lng" or `{lat, lng}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateInput {
    Text(String),
    LatLng(Coordinate),
}

impl CoordinateInput {
    /// Resolve to a coordinate; malformed text counts as unknown
    pub fn to_coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Text(s) => s.parse().ok(),
            Self::LatLng(c) => Some(*c),
        }
    }
}

/// A place reference from a client: a bare name or a structured place
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaceInput {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        coordinate: Option<CoordinateInput>,
        #[serde(default, rename = "placeId", alias = "place_id")]
        place_id: Option<String>,
        #[serde(default, rename = "formattedAddress", alias = "formatted_address")]
        formatted_address: Option<String>,
    },
}

impl PlaceInput {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed { name, .. } => name,
        }
    }

    /// Blank entries are skipped by the itinerary reconciler
    pub fn is_blank(&self) -> bool {
        self.name().trim().is_empty()
    }

    /// Convert to resolver input
    pub fn to_new_location(&self) -> NewLocation {
        match self {
            Self::Name(name) => NewLocation::named(name.trim()),
            Self::Detailed {
                name,
                coordinate,
                place_id,
                formatted_address,
            } => NewLocation {
                name: name.trim().to_string(),
                coordinate: coordinate.as_ref().and_then(CoordinateInput::to_coordinate),
                place_id: place_id.clone(),
                formatted_address: formatted_address.clone(),
            },
        }
    }
}

impl From<&str> for PlaceInput {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

// ========== Booking Models ==========

/// A booked flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightBooking {
    pub id: i64,
    pub trip_id: i64,
    #[serde(flatten)]
    pub details: FlightDetails,
    pub created_at: DateTime<Utc>,
}

/// Editable flight fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightDetails {
    pub airline: String,
    pub flight_number: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: Option<NaiveDateTime>,
    pub arrival_time: Option<NaiveDateTime>,
    pub booking_reference: Option<String>,
    pub price: Option<f64>,
}

/// A booked stay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccommodationBooking {
    pub id: i64,
    pub trip_id: i64,
    pub location_id: i64,
    pub location_name: String,
    pub name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub booking_reference: Option<String>,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Editable accommodation fields; `location` is resolved to a location row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccommodationDetails {
    pub name: String,
    pub location: PlaceInput,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub booking_reference: Option<String>,
    pub price: Option<f64>,
}

/// A booked activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityBooking {
    pub id: i64,
    pub trip_id: i64,
    pub location_id: i64,
    pub location_name: String,
    pub name: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub booking_reference: Option<String>,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Editable activity fields; `location` is resolved to a location row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDetails {
    pub name: String,
    pub location: PlaceInput,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub booking_reference: Option<String>,
    pub price: Option<f64>,
}

/// All bookings of a trip
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripBookings {
    pub flights: Vec<FlightBooking>,
    pub accommodations: Vec<AccommodationBooking>,
    pub activities: Vec<ActivityBooking>,
}

// ========== Itinerary Models ==========

/// A place planned for an itinerary day, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryPlace {
    pub location_id: i64,
    pub name: String,
    pub coordinate: String,
    pub place_id: Option<String>,
    pub formatted_address: Option<String>,
}

/// Map marker for a place with a usable coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// One day of a trip's itinerary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// "Day N"
    pub label: String,
    pub day_number: i64,
    pub date: NaiveDate,
    pub places: Vec<ItineraryPlace>,
    pub markers: Vec<MapMarker>,
}

/// The whole itinerary of a trip, ordered by day number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    pub trip_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<ItineraryDay>,
}

impl Itinerary {
    /// Look up a day by its "Day N" label
    pub fn day(&self, label: &str) -> Option<&ItineraryDay> {
        self.days.iter().find(|d| d.label == label)
    }

    /// Place names of a day, in order (empty if the day is unknown)
    pub fn place_names(&self, label: &str) -> Vec<&str> {
        self.day(label)
            .map(|d| d.places.iter().map(|p| p.name.as_str()).collect())
            .unwrap_or_default()
    }
}

// ========== Expense Models ==========

/// A recorded expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub trip_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    /// Canonical lowercase category key
    pub category: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New or replacement expense fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub remarks: Option<String>,
}

/// Aggregated spend for a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub budget: Option<f64>,
    pub total_spent: f64,
    /// Budget minus total spend (budget counts as zero when unset)
    pub balance: f64,
    /// Category key -> total amount
    pub by_category: std::collections::BTreeMap<String, f64>,
    pub expense_count: usize,
}

// ========== Audit ==========

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub user: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}
