//! Activities, accommodations and transport: everything listed per trip.

use anyhow::Result;
use clap::{Args, Subcommand};
use client::Planner;
use shared::{
    form::{AccommodationForm, ActivityForm, FormState, TransportForm},
    models::{Accommodation, AccommodationId, Activity, ActivityId, TransportId, TransportLeg, TripId},
};

use super::{hint, loaded};

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    /// List the activities of a trip
    List {
        #[arg(long, short, help = "Trip id")]
        trip: TripId,
    },
    /// Add an activity to a trip
    Add(AddActivityArgs),
    /// Delete an activity
    Delete {
        #[arg(help = "Activity id")]
        id: ActivityId,
    },
}

#[derive(Args, Debug)]
pub struct AddActivityArgs {
    #[arg(long, short, help = "Trip id")]
    pub trip: TripId,
    #[arg(long, short, help = "Activity name")]
    pub name: String,
    #[arg(long, short, help = "Where it takes place")]
    pub location: String,
    #[arg(long, short, help = "Day (YYYY-MM-DD)")]
    pub date: String,
    #[arg(long, help = "Start time (HH:MM)")]
    pub time: String,
    #[arg(long, help = "Category (e.g., Sightseeing)")]
    pub category: String,
    #[arg(long, short, default_value = "0", help = "Price")]
    pub price: String,
    #[arg(long, short, default_value = "3", help = "Rating from 1 to 5")]
    pub rating: String,
}

#[derive(Subcommand, Debug)]
pub enum AccommodationCommand {
    /// List the accommodations of a trip
    List {
        #[arg(long, short, help = "Trip id")]
        trip: TripId,
    },
    /// Add an accommodation to a trip
    Add(AddAccommodationArgs),
    /// Delete an accommodation
    Delete {
        #[arg(help = "Accommodation id")]
        id: AccommodationId,
    },
}

#[derive(Args, Debug)]
pub struct AddAccommodationArgs {
    #[arg(long, short, help = "Trip id")]
    pub trip: TripId,
    #[arg(long, short, help = "Accommodation name")]
    pub name: String,
    #[arg(long, help = "Short description")]
    pub description: Option<String>,
    #[arg(long, short, help = "Address or area")]
    pub location: String,
    #[arg(long, short, help = "Price per stay")]
    pub price: String,
    #[arg(long, short, default_value = "3", help = "Rating from 1 to 5")]
    pub rating: String,
    #[arg(long = "type", short = 'k', help = "Kind of stay (e.g., Hotel)")]
    pub kind: String,
    #[arg(long, short, help = "Comma-separated amenities")]
    pub amenities: Option<String>,
    #[arg(long, help = "Check-in day (YYYY-MM-DD)")]
    pub check_in: String,
    #[arg(long, help = "Check-out day (YYYY-MM-DD)")]
    pub check_out: String,
}

#[derive(Subcommand, Debug)]
pub enum TransportCommand {
    /// List the transport legs of a trip
    List {
        #[arg(long, short, help = "Trip id")]
        trip: TripId,
    },
    /// Add a transport leg to a trip
    Add(AddTransportArgs),
    /// Delete a transport leg
    Delete {
        #[arg(help = "Transport id")]
        id: TransportId,
    },
}

#[derive(Args, Debug)]
pub struct AddTransportArgs {
    #[arg(long, short, help = "Trip id")]
    pub trip: TripId,
    #[arg(long = "type", short = 'k', help = "Mode of transport (e.g., Bus)")]
    pub kind: String,
    #[arg(long, help = "Operator")]
    pub company: String,
    #[arg(long, help = "Departure place")]
    pub from: String,
    #[arg(long, help = "Arrival place")]
    pub to: String,
    #[arg(long, help = "Departure (YYYY-MM-DDTHH:MM)")]
    pub departure: String,
    #[arg(long, help = "Arrival (YYYY-MM-DDTHH:MM)")]
    pub arrival: String,
}

/// Runs an `activities` subcommand.
///
/// # Errors
/// Returns an error if the input is invalid or the request fails.
pub async fn activities(planner: &Planner, command: ActivityCommand) -> Result<()> {
    match command {
        ActivityCommand::List { trip } => {
            let items = loaded(planner.activities(Some(trip)).await)?;
            if items.is_empty() {
                println!("No activities planned for trip {trip}.");
            }
            for activity in items.iter() {
                print_activity(activity);
            }
        }
        ActivityCommand::Add(args) => {
            let draft = FormState::with_model(ActivityForm::for_trip(Some(args.trip)))
                .with("name", args.name)?
                .with("location", args.location)?
                .with("date", args.date)?
                .with("time", args.time)?
                .with("category", args.category)?
                .with("price", args.price)?
                .with("rating", args.rating)?
                .submit()?;
            let activity = planner.add_activity(&draft).await.map_err(hint)?;
            println!("Added activity {}", activity.id);
            print_activity(&activity);
        }
        ActivityCommand::Delete { id } => {
            planner.delete_activity(id).await.map_err(hint)?;
            println!("Deleted activity {id}");
        }
    }
    Ok(())
}

/// Runs an `accommodations` subcommand.
///
/// # Errors
/// Returns an error if the input is invalid or the request fails.
pub async fn accommodations(planner: &Planner, command: AccommodationCommand) -> Result<()> {
    match command {
        AccommodationCommand::List { trip } => {
            let items = loaded(planner.accommodations(Some(trip)).await)?;
            if items.is_empty() {
                println!("No accommodations booked for trip {trip}.");
            }
            for stay in items.iter() {
                print_accommodation(stay);
            }
        }
        AccommodationCommand::Add(args) => {
            let mut form = FormState::with_model(AccommodationForm::for_trip(Some(args.trip)));
            form.set("name", args.name)?
                .set_opt("description", args.description)?
                .set("location", args.location)?
                .set("price", args.price)?
                .set("rating", args.rating)?
                .set("type", args.kind)?
                .set_opt("amenities", args.amenities)?
                .set("checkIn", args.check_in)?
                .set("checkOut", args.check_out)?;
            let draft = form.submit()?;
            let stay = planner.add_accommodation(&draft).await.map_err(hint)?;
            println!("Added accommodation {}", stay.id);
            print_accommodation(&stay);
        }
        AccommodationCommand::Delete { id } => {
            planner.delete_accommodation(id).await.map_err(hint)?;
            println!("Deleted accommodation {id}");
        }
    }
    Ok(())
}

/// Runs a `transport` subcommand.
///
/// # Errors
/// Returns an error if the input is invalid or the request fails.
pub async fn transport(planner: &Planner, command: TransportCommand) -> Result<()> {
    match command {
        TransportCommand::List { trip } => {
            let legs = loaded(planner.transport(Some(trip)).await)?;
            if legs.is_empty() {
                println!("No transport planned for trip {trip}.");
            }
            for leg in legs.iter() {
                print_leg(leg);
            }
        }
        TransportCommand::Add(args) => {
            let draft = FormState::with_model(TransportForm::for_trip(Some(args.trip)))
                .with("type", args.kind)?
                .with("company", args.company)?
                .with("from", args.from)?
                .with("to", args.to)?
                .with("departureTime", args.departure)?
                .with("arrivalTime", args.arrival)?
                .submit()?;
            let leg = planner.add_transport(&draft).await.map_err(hint)?;
            println!("Added transport {}", leg.id);
            print_leg(&leg);
        }
        TransportCommand::Delete { id } => {
            planner.delete_transport(id).await.map_err(hint)?;
            println!("Deleted transport {id}");
        }
    }
    Ok(())
}

fn print_activity(activity: &Activity) {
    println!(
        "#{:<5} {} {} {:<24} @ {} [{}] {:.2} ({}/5)",
        activity.id,
        activity.date,
        activity.time.format("%H:%M"),
        activity.name,
        activity.location,
        activity.category,
        activity.price,
        activity.rating
    );
}

fn print_accommodation(stay: &Accommodation) {
    println!(
        "#{:<5} {:<24} {} {} → {} ({} nights) {:.2} ({}/5)",
        stay.id,
        stay.name,
        stay.kind,
        stay.check_in,
        stay.check_out,
        stay.nights(),
        stay.price,
        stay.rating
    );
    if !stay.amenities.is_empty() {
        println!("       amenities: {}", stay.amenities.join(", "));
    }
}

fn print_leg(leg: &TransportLeg) {
    println!(
        "#{:<5} {} {} {} → {} {} → {} ({} min)",
        leg.id,
        leg.kind,
        leg.company,
        leg.from,
        leg.to,
        leg.departure_time.format("%Y-%m-%d %H:%M"),
        leg.arrival_time.format("%H:%M"),
        leg.duration_minutes()
    );
}
