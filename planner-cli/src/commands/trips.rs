use anyhow::Result;
use clap::{Args, Subcommand};
use client::Planner;
use shared::{
    form::{FormState, TripForm},
    models::{Trip, TripId},
};

use super::{hint, loaded};

#[derive(Subcommand, Debug)]
pub enum TripCommand {
    /// List your trips
    List,
    /// Show one trip
    Show {
        #[arg(help = "Trip id")]
        id: TripId,
    },
    /// Create a trip
    Create(CreateTripArgs),
    /// Delete a trip
    Delete {
        #[arg(help = "Trip id")]
        id: TripId,
    },
}

#[derive(Args, Debug)]
pub struct CreateTripArgs {
    #[arg(long, short, help = "Where the trip goes")]
    pub destination: String,

    #[arg(long, short, help = "First day (YYYY-MM-DD)")]
    pub start: String,

    #[arg(long, short, help = "Last day (YYYY-MM-DD)")]
    pub end: String,
}

/// Runs a `trips` subcommand.
///
/// # Errors
/// Returns an error if nobody is signed in, the input is invalid, or the
/// request fails.
pub async fn run(planner: &Planner, command: TripCommand) -> Result<()> {
    match command {
        TripCommand::List => {
            let trips = loaded(planner.trips().await.map_err(hint)?)?;
            if trips.is_empty() {
                println!("No trips yet. Create one with `planner trips create`.");
            }
            for trip in trips.iter() {
                print_trip(trip);
            }
        }
        TripCommand::Show { id } => {
            let trip = loaded(planner.trip(id).await)?;
            print_trip(&trip);
        }
        TripCommand::Create(args) => {
            let owner = planner.session().current_user().map(|user| user.id);
            let draft = FormState::with_model(TripForm::for_user(owner))
                .with("destination", args.destination)?
                .with("startDate", args.start)?
                .with("endDate", args.end)?
                .submit()?;
            let trip = planner.create_trip(&draft).await.map_err(hint)?;
            println!("Created trip {}", trip.id);
            print_trip(&trip);
        }
        TripCommand::Delete { id } => {
            planner.delete_trip(id).await.map_err(hint)?;
            println!("Deleted trip {id}");
        }
    }
    Ok(())
}

fn print_trip(trip: &Trip) {
    println!(
        "#{:<5} {:<24} {} → {} ({} days)",
        trip.id,
        trip.destination,
        trip.start_date,
        trip.end_date,
        trip.duration_days()
    );
}
