use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::serde_helpers::comma_list;
use super::trip::TripId;

/// Backend identifier of an accommodation.
pub type AccommodationId = i64;

/// A place to stay during a trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Accommodation {
    /// Backend id.
    pub id: AccommodationId,
    /// Property name.
    pub name: String,
    /// Free text from the listing.
    #[serde(default)]
    pub description: String,
    /// Address or area.
    pub location: String,
    /// Total price of the stay.
    pub price: f64,
    /// 1 to 5.
    pub rating: u8,
    /// Hotel, hostel, apartment, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Amenities such as `WiFi`.
    #[serde(default, with = "comma_list")]
    pub amenities: Vec<String>,
    /// Arrival day.
    pub check_in: NaiveDate,
    /// Departure day.
    pub check_out: NaiveDate,
    /// Owning trip, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<TripId>,
}

impl Accommodation {
    /// Nights between check-in and check-out.
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days().max(0)
    }
}

/// Payload for `POST /accommodations`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAccommodation {
    /// Property name.
    pub name: String,
    /// Free text.
    pub description: String,
    /// Address or area.
    pub location: String,
    /// Total price of the stay.
    pub price: f64,
    /// 1 to 5.
    pub rating: u8,
    /// Hotel, hostel, apartment, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Amenities, sent as an array.
    #[serde(with = "comma_list")]
    pub amenities: Vec<String>,
    /// Arrival day.
    pub check_in: NaiveDate,
    /// Departure day, not before `check_in`.
    pub check_out: NaiveDate,
    /// Trip the stay is added to.
    pub trip_id: TripId,
}

/// Payload for `PUT /accommodations/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationUpdate {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Replacement amenity list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    /// New arrival day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<NaiveDate>,
    /// New departure day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amenities_as_joined_string() {
        let json = r#"{"id":4,"name":"Hotel Dajti","location":"Tirana","price":80.0,"rating":4,"type":"Hotel","amenities":"WiFi, Pool,,Parking","checkIn":"2025-06-01","checkOut":"2025-06-04","tripId":3}"#;
        let stay: Accommodation = serde_json::from_str(json).unwrap();
        assert_eq!(stay.amenities, vec!["WiFi", "Pool", "Parking"]);
        assert_eq!(stay.description, "");
        assert_eq!(stay.nights(), 3);
    }

    #[test]
    fn test_amenities_as_array_or_null() {
        let json = r#"{"id":4,"name":"Villa","location":"Himarë","price":120.0,"rating":5,"type":"Villa","amenities":["Sea view"],"checkIn":"2025-07-01","checkOut":"2025-07-02"}"#;
        let stay: Accommodation = serde_json::from_str(json).unwrap();
        assert_eq!(stay.amenities, vec!["Sea view"]);

        let json = r#"{"id":5,"name":"Hostel","location":"Korçë","price":15.0,"rating":3,"type":"Hostel","amenities":null,"checkIn":"2025-07-01","checkOut":"2025-07-02"}"#;
        let stay: Accommodation = serde_json::from_str(json).unwrap();
        assert!(stay.amenities.is_empty());
    }

    #[test]
    fn test_new_accommodation_uses_type_key() {
        let draft = NewAccommodation {
            name: "Hotel Dajti".to_string(),
            description: String::new(),
            location: "Tirana".to_string(),
            price: 80.0,
            rating: 4,
            kind: "Hotel".to_string(),
            amenities: vec!["WiFi".to_string()],
            check_in: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
            trip_id: 3,
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["type"], "Hotel");
        assert_eq!(value["amenities"][0], "WiFi");
        assert_eq!(value["checkIn"], "2025-06-01");
    }
}
