//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// TravelEase - Plan trips, itineraries and travel budgets
#[derive(Parser)]
#[command(name = "travelease")]
#[command(about = "Self-hosted trip planner", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "travelease.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TRAVELEASE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an identity proxy header or API key.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing the web client to serve (e.g., web/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show database status
    Status,

    /// Manage trips
    Trips {
        #[command(subcommand)]
        action: Option<TripsAction>,
    },

    /// Show or edit a trip's itinerary
    Itinerary {
        /// Trip ID
        trip_id: i64,

        #[command(subcommand)]
        action: Option<ItineraryAction>,
    },

    /// List a trip's flight, accommodation and activity bookings
    Bookings {
        /// Trip ID
        trip_id: i64,
    },

    /// Track trip expenses
    Expenses {
        #[command(subcommand)]
        action: ExpensesAction,
    },
}

#[derive(Subcommand)]
pub enum TripsAction {
    /// List all trips
    List,

    /// Create a trip
    Create {
        /// Trip name
        name: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Number of travellers
        #[arg(long, default_value = "1")]
        tourists: i64,

        /// Free-text label (e.g. family, business)
        #[arg(long)]
        tag: Option<String>,

        /// Budget amount
        #[arg(long)]
        budget: Option<String>,
    },

    /// Show trip details with budget summary
    Show {
        /// Trip ID
        id: i64,
    },

    /// Set the budget of a trip (omit amount to clear)
    Budget {
        /// Trip ID
        id: i64,

        /// Budget amount
        amount: Option<String>,
    },

    /// Delete a trip with its bookings, itinerary and expenses
    Delete {
        /// Trip ID
        id: i64,
    },

    /// Export a trip as JSON
    Export {
        /// Trip ID
        id: i64,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ItineraryAction {
    /// Show all days (default)
    Show,

    /// Replace the places of one day
    Set {
        /// Day label ("Day 2" or 2)
        day: String,

        /// Place names, in visiting order
        places: Vec<String>,
    },

    /// Clear one day
    Delete {
        /// Day label ("Day 2" or 2)
        day: String,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List a trip's expenses
    List {
        /// Trip ID
        trip_id: i64,
    },

    /// Record an expense
    Add {
        /// Trip ID
        trip_id: i64,

        /// Amount spent
        amount: String,

        /// Category: fnb, transportation, accommodation, activities, shopping, others
        #[arg(short, long, default_value = "others")]
        category: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Free-text note
        #[arg(short, long)]
        remarks: Option<String>,
    },

    /// Show spend by category against the budget
    Summary {
        /// Trip ID
        trip_id: i64,
    },

    /// Export expenses as CSV
    Export {
        /// Trip ID
        trip_id: i64,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
