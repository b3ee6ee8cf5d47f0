use shared::models::{
    Accommodation, AccommodationId, AccommodationUpdate, Activity, ActivityId, ActivityUpdate,
    NewAccommodation, NewActivity, NewTransportLeg, NewTrip, TransportId, TransportLeg,
    TransportUpdate, Trip, TripId, TripUpdate, UserId,
};

use super::Resource;

/// `/trips`, listed per user.
#[derive(Debug, Clone, Copy)]
pub struct Trips;

impl Resource for Trips {
    type Id = TripId;
    type Scope = UserId;
    type Item = Trip;
    type Draft = NewTrip;
    type Patch = TripUpdate;

    const NAME: &'static str = "trips";

    fn list_path(user_id: &UserId) -> String {
        format!("trips/user/{user_id}")
    }

    fn item_path(id: &TripId) -> String {
        format!("trips/{id}")
    }

    fn create_path() -> &'static str {
        "trips/createTrip"
    }
}

/// `/activities`, listed per trip.
#[derive(Debug, Clone, Copy)]
pub struct Activities;

impl Resource for Activities {
    type Id = ActivityId;
    type Scope = TripId;
    type Item = Activity;
    type Draft = NewActivity;
    type Patch = ActivityUpdate;

    const NAME: &'static str = "activities";

    fn list_path(trip_id: &TripId) -> String {
        format!("activities/trip/{trip_id}")
    }

    fn item_path(id: &ActivityId) -> String {
        format!("activities/{id}")
    }

    fn create_path() -> &'static str {
        "activities/addActivity"
    }
}

/// `/accommodations`, listed per trip.
#[derive(Debug, Clone, Copy)]
pub struct Accommodations;

impl Resource for Accommodations {
    type Id = AccommodationId;
    type Scope = TripId;
    type Item = Accommodation;
    type Draft = NewAccommodation;
    type Patch = AccommodationUpdate;

    const NAME: &'static str = "accommodations";

    fn list_path(trip_id: &TripId) -> String {
        format!("accommodations/trip/{trip_id}")
    }

    fn item_path(id: &AccommodationId) -> String {
        format!("accommodations/{id}")
    }

    fn create_path() -> &'static str {
        "accommodations"
    }
}

/// `/transports`, listed per trip.
#[derive(Debug, Clone, Copy)]
pub struct Transports;

impl Resource for Transports {
    type Id = TransportId;
    type Scope = TripId;
    type Item = TransportLeg;
    type Draft = NewTransportLeg;
    type Patch = TransportUpdate;

    const NAME: &'static str = "transport";

    fn list_path(trip_id: &TripId) -> String {
        format!("transports/trip/{trip_id}")
    }

    fn item_path(id: &TransportId) -> String {
        format!("transports/{id}")
    }

    fn create_path() -> &'static str {
        "transports/addTransport"
    }
}
