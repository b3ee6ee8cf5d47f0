use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::serde_helpers::clock_time;
use super::trip::TripId;

/// Backend identifier of an activity.
pub type ActivityId = i64;

/// Something planned on a given day of a trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Backend id.
    pub id: ActivityId,
    /// What the activity is.
    pub name: String,
    /// Where it takes place.
    pub location: String,
    /// Day of the activity.
    pub date: NaiveDate,
    /// Local start time.
    #[serde(with = "clock_time")]
    pub time: NaiveTime,
    /// Free-form category such as `Sightseeing`.
    pub category: String,
    /// Cost per person.
    pub price: f64,
    /// 1 to 5.
    pub rating: u8,
    /// Owning trip, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<TripId>,
}

/// Payload for `POST /activities/addActivity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    /// What the activity is.
    pub name: String,
    /// Where it takes place.
    pub location: String,
    /// Day of the activity.
    pub date: NaiveDate,
    /// Local start time.
    #[serde(with = "clock_time")]
    pub time: NaiveTime,
    /// Free-form category.
    pub category: String,
    /// Cost per person.
    pub price: f64,
    /// 1 to 5.
    pub rating: u8,
    /// Trip the activity is added to.
    pub trip_id: TripId,
}

/// Payload for `PUT /activities/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdate {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// New day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_accepts_time_with_seconds() {
        let json = r#"{"id":11,"name":"Castle tour","location":"Gjirokastër","date":"2025-06-02","time":"10:00:00","category":"Sightseeing","price":12.5,"rating":5,"tripId":3}"#;
        let activity: Activity = serde_json::from_str(json).unwrap();
        assert_eq!(activity.time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(activity.trip_id, Some(3));
    }

    #[test]
    fn test_new_activity_serializes_short_time() {
        let draft = NewActivity {
            name: "Boat trip".to_string(),
            location: "Ksamil".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            time: NaiveTime::from_hms_opt(15, 45, 0).unwrap(),
            category: "Outdoors".to_string(),
            price: 30.0,
            rating: 4,
            trip_id: 3,
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["time"], "15:45");
        assert_eq!(value["tripId"], 3);
    }
}
