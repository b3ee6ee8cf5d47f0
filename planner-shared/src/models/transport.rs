use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::serde_helpers::local_datetime;
use super::trip::TripId;

/// Backend identifier of a transport leg.
pub type TransportId = i64;

/// One leg of travel (flight, bus, ferry, ...) within a trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransportLeg {
    /// Backend id.
    pub id: TransportId,
    /// Flight, train, bus, ferry, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Carrier or operator.
    pub company: String,
    /// Departure place.
    pub from: String,
    /// Arrival place.
    pub to: String,
    /// Local departure time.
    #[serde(with = "local_datetime")]
    pub departure_time: NaiveDateTime,
    /// Local arrival time.
    #[serde(with = "local_datetime")]
    pub arrival_time: NaiveDateTime,
    /// Owning trip, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<TripId>,
}

impl TransportLeg {
    /// Travel time in minutes; zero if the arrival precedes departure.
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.arrival_time - self.departure_time).num_minutes().max(0)
    }
}

/// Payload for `POST /transports/addTransport`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTransportLeg {
    /// Flight, train, bus, ferry, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Carrier or operator.
    pub company: String,
    /// Departure place.
    pub from: String,
    /// Arrival place.
    pub to: String,
    /// Local departure time.
    #[serde(with = "local_datetime")]
    pub departure_time: NaiveDateTime,
    /// Local arrival time.
    #[serde(with = "local_datetime")]
    pub arrival_time: NaiveDateTime,
    /// Trip the leg is added to.
    pub trip_id: TripId,
}

/// Payload for `PUT /transports/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransportUpdate {
    /// New carrier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// New departure place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// New arrival place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}
