use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Backend identifier of a trip.
pub type TripId = i64;

/// A trip owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Backend id.
    pub id: TripId,
    /// Where the trip goes.
    pub destination: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Owner, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Trip {
    /// Number of days between start and end, regardless of their order.
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days().abs()
    }
}

/// Payload for `POST /trips/createTrip`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    /// Where the trip goes.
    pub destination: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day, not before `start_date`.
    pub end_date: NaiveDate,
    /// Owner. Always the signed-in user.
    pub user_id: UserId,
}

/// Payload for `PUT /trips/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TripUpdate {
    /// New destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// New first day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// New last day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}
