//! TravelEase CLI - Self-hosted trip planner
//!
//! Usage:
//!   travelease init                              Initialize database
//!   travelease trips create Lisbon --start ...   Plan a trip
//!   travelease itinerary 1 set "Day 2" A B       Plan a day
//!   travelease serve --port 3000                 Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Trips { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(TripsAction::List) => commands::cmd_trips_list(&db),
                Some(TripsAction::Create {
                    name,
                    start,
                    end,
                    tourists,
                    tag,
                    budget,
                }) => commands::cmd_trips_create(
                    &db,
                    &name,
                    &start,
                    &end,
                    tourists,
                    tag.as_deref(),
                    budget.as_deref(),
                )
                .map(|_| ()),
                Some(TripsAction::Show { id }) => commands::cmd_trips_show(&db, id),
                Some(TripsAction::Budget { id, amount }) => {
                    commands::cmd_trips_budget(&db, id, amount.as_deref())
                }
                Some(TripsAction::Delete { id }) => commands::cmd_trips_delete(&db, id),
                Some(TripsAction::Export { id, output }) => {
                    commands::cmd_trips_export(&db, id, output.as_deref())
                }
            }
        }
        Commands::Itinerary { trip_id, action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(ItineraryAction::Show) => commands::cmd_itinerary_show(&db, trip_id),
                Some(ItineraryAction::Set { day, places }) => {
                    commands::cmd_itinerary_set(&db, trip_id, &day, &places)
                }
                Some(ItineraryAction::Delete { day }) => {
                    commands::cmd_itinerary_delete(&db, trip_id, &day)
                }
            }
        }
        Commands::Bookings { trip_id } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_bookings_list(&db, trip_id)
        }
        Commands::Expenses { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                ExpensesAction::List { trip_id } => commands::cmd_expenses_list(&db, trip_id),
                ExpensesAction::Add {
                    trip_id,
                    amount,
                    category,
                    date,
                    remarks,
                } => commands::cmd_expenses_add(
                    &db,
                    trip_id,
                    &amount,
                    &category,
                    date.as_deref(),
                    remarks.as_deref(),
                )
                .map(|_| ()),
                ExpensesAction::Summary { trip_id } => {
                    commands::cmd_expenses_summary(&db, trip_id)
                }
                ExpensesAction::Export { trip_id, output } => {
                    commands::cmd_expenses_export(&db, trip_id, output.as_deref())
                }
            }
        }
    }
}
