//! Forms for the trip and its children. Child forms are bound to the trip
//! selected when they were opened; without one they cannot submit.

use super::{
    FormModel, ValidationErrors, ensure_not_before, optional, parse_date, parse_datetime,
    parse_price, parse_rating, parse_time, required,
};
use crate::models::{NewAccommodation, NewActivity, NewTransportLeg, NewTrip, TripId, UserId};

const NO_TRIP: &str = "select a trip first";

fn require_trip(errors: &mut ValidationErrors, trip_id: Option<TripId>) -> Option<TripId> {
    if trip_id.is_none() {
        errors.add("tripId", NO_TRIP);
    }
    trip_id
}

/// New trip, owned by the signed-in user.
#[derive(Debug, Clone, Default)]
pub struct TripForm {
    owner: Option<UserId>,
    destination: String,
    start_date: String,
    end_date: String,
}

impl TripForm {
    /// A blank trip form owned by `owner`. Submitting without an owner fails.
    #[must_use]
    pub fn for_user(owner: Option<UserId>) -> Self {
        Self {
            owner,
            ..Self::default()
        }
    }
}

impl FormModel for TripForm {
    type Output = NewTrip;

    const FIELDS: &'static [&'static str] = &["destination", "startDate", "endDate"];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "destination" => self.destination = value,
            "startDate" => self.start_date = value,
            "endDate" => self.end_date = value,
            _ => return false,
        }
        true
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "destination" => Some(&self.destination),
            "startDate" => Some(&self.start_date),
            "endDate" => Some(&self.end_date),
            _ => None,
        }
    }

    fn validate(&self) -> Result<NewTrip, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.owner.is_none() {
            errors.add("userId", "sign in to create a trip");
        }
        let destination = required(&mut errors, "destination", &self.destination);
        let start = parse_date(&mut errors, "startDate", &self.start_date);
        let end = parse_date(&mut errors, "endDate", &self.end_date);
        ensure_not_before(
            &mut errors,
            "endDate",
            start.as_ref(),
            end.as_ref(),
            "must not be before the start date",
        );
        match (self.owner, destination, start, end) {
            (Some(user_id), Some(destination), Some(start_date), Some(end_date))
                if errors.is_empty() =>
            {
                Ok(NewTrip {
                    destination,
                    start_date,
                    end_date,
                    user_id,
                })
            }
            _ => Err(errors),
        }
    }
}

/// New activity within a trip.
#[derive(Debug, Clone, Default)]
pub struct ActivityForm {
    trip_id: Option<TripId>,
    name: String,
    location: String,
    date: String,
    time: String,
    category: String,
    price: String,
    rating: String,
}

impl ActivityForm {
    /// A blank activity form for the selected trip.
    #[must_use]
    pub fn for_trip(trip_id: Option<TripId>) -> Self {
        Self {
            trip_id,
            ..Self::default()
        }
    }
}

impl FormModel for ActivityForm {
    type Output = NewActivity;

    const FIELDS: &'static [&'static str] = &[
        "name", "location", "date", "time", "category", "price", "rating",
    ];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "location" => &mut self.location,
            "date" => &mut self.date,
            "time" => &mut self.time,
            "category" => &mut self.category,
            "price" => &mut self.price,
            "rating" => &mut self.rating,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn field(&self, field: &str) -> Option<&str> {
        let value = match field {
            "name" => &self.name,
            "location" => &self.location,
            "date" => &self.date,
            "time" => &self.time,
            "category" => &self.category,
            "price" => &self.price,
            "rating" => &self.rating,
            _ => return None,
        };
        Some(value)
    }

    fn validate(&self) -> Result<NewActivity, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let trip_id = require_trip(&mut errors, self.trip_id);
        let name = required(&mut errors, "name", &self.name);
        let location = required(&mut errors, "location", &self.location);
        let date = parse_date(&mut errors, "date", &self.date);
        let time = parse_time(&mut errors, "time", &self.time);
        let category = required(&mut errors, "category", &self.category);
        let price = parse_price(&mut errors, "price", &self.price);
        let rating = parse_rating(&mut errors, "rating", &self.rating);
        if !errors.is_empty() {
            return Err(errors);
        }
        match (trip_id, name, location, date, time, category, price, rating) {
            (
                Some(trip_id),
                Some(name),
                Some(location),
                Some(date),
                Some(time),
                Some(category),
                Some(price),
                Some(rating),
            ) => Ok(NewActivity {
                name,
                location,
                date,
                time,
                category,
                price,
                rating,
                trip_id,
            }),
            _ => Err(errors),
        }
    }
}

/// New accommodation within a trip. Amenities are entered comma-separated.
#[derive(Debug, Clone, Default)]
pub struct AccommodationForm {
    trip_id: Option<TripId>,
    name: String,
    description: String,
    location: String,
    price: String,
    rating: String,
    kind: String,
    amenities: String,
    check_in: String,
    check_out: String,
}

impl AccommodationForm {
    /// A blank accommodation form for the selected trip.
    #[must_use]
    pub fn for_trip(trip_id: Option<TripId>) -> Self {
        Self {
            trip_id,
            ..Self::default()
        }
    }
}

impl FormModel for AccommodationForm {
    type Output = NewAccommodation;

    const FIELDS: &'static [&'static str] = &[
        "name",
        "description",
        "location",
        "price",
        "rating",
        "type",
        "amenities",
        "checkIn",
        "checkOut",
    ];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "location" => &mut self.location,
            "price" => &mut self.price,
            "rating" => &mut self.rating,
            "type" => &mut self.kind,
            "amenities" => &mut self.amenities,
            "checkIn" => &mut self.check_in,
            "checkOut" => &mut self.check_out,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn field(&self, field: &str) -> Option<&str> {
        let value = match field {
            "name" => &self.name,
            "description" => &self.description,
            "location" => &self.location,
            "price" => &self.price,
            "rating" => &self.rating,
            "type" => &self.kind,
            "amenities" => &self.amenities,
            "checkIn" => &self.check_in,
            "checkOut" => &self.check_out,
            _ => return None,
        };
        Some(value)
    }

    fn validate(&self) -> Result<NewAccommodation, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let trip_id = require_trip(&mut errors, self.trip_id);
        let name = required(&mut errors, "name", &self.name);
        let location = required(&mut errors, "location", &self.location);
        let price = parse_price(&mut errors, "price", &self.price);
        let rating = parse_rating(&mut errors, "rating", &self.rating);
        let kind = required(&mut errors, "type", &self.kind);
        let check_in = parse_date(&mut errors, "checkIn", &self.check_in);
        let check_out = parse_date(&mut errors, "checkOut", &self.check_out);
        ensure_not_before(
            &mut errors,
            "checkOut",
            check_in.as_ref(),
            check_out.as_ref(),
            "must not be before check-in",
        );
        let amenities: Vec<String> = self
            .amenities
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        if !errors.is_empty() {
            return Err(errors);
        }
        match (trip_id, name, location, price, rating, kind, check_in, check_out) {
            (
                Some(trip_id),
                Some(name),
                Some(location),
                Some(price),
                Some(rating),
                Some(kind),
                Some(check_in),
                Some(check_out),
            ) => Ok(NewAccommodation {
                name,
                description: optional(&self.description).unwrap_or_default(),
                location,
                price,
                rating,
                kind,
                amenities,
                check_in,
                check_out,
                trip_id,
            }),
            _ => Err(errors),
        }
    }
}

/// New transport leg within a trip.
#[derive(Debug, Clone, Default)]
pub struct TransportForm {
    trip_id: Option<TripId>,
    kind: String,
    company: String,
    from: String,
    to: String,
    departure_time: String,
    arrival_time: String,
}

impl TransportForm {
    /// A blank transport form for the selected trip.
    #[must_use]
    pub fn for_trip(trip_id: Option<TripId>) -> Self {
        Self {
            trip_id,
            ..Self::default()
        }
    }
}

impl FormModel for TransportForm {
    type Output = NewTransportLeg;

    const FIELDS: &'static [&'static str] = &[
        "type",
        "company",
        "from",
        "to",
        "departureTime",
        "arrivalTime",
    ];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "type" => &mut self.kind,
            "company" => &mut self.company,
            "from" => &mut self.from,
            "to" => &mut self.to,
            "departureTime" => &mut self.departure_time,
            "arrivalTime" => &mut self.arrival_time,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn field(&self, field: &str) -> Option<&str> {
        let value = match field {
            "type" => &self.kind,
            "company" => &self.company,
            "from" => &self.from,
            "to" => &self.to,
            "departureTime" => &self.departure_time,
            "arrivalTime" => &self.arrival_time,
            _ => return None,
        };
        Some(value)
    }

    fn validate(&self) -> Result<NewTransportLeg, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let trip_id = require_trip(&mut errors, self.trip_id);
        let kind = required(&mut errors, "type", &self.kind);
        let company = required(&mut errors, "company", &self.company);
        let from = required(&mut errors, "from", &self.from);
        let to = required(&mut errors, "to", &self.to);
        let departure = parse_datetime(&mut errors, "departureTime", &self.departure_time);
        let arrival = parse_datetime(&mut errors, "arrivalTime", &self.arrival_time);
        ensure_not_before(
            &mut errors,
            "arrivalTime",
            departure.as_ref(),
            arrival.as_ref(),
            "must not be before departure",
        );
        if !errors.is_empty() {
            return Err(errors);
        }
        match (trip_id, kind, company, from, to, departure, arrival) {
            (
                Some(trip_id),
                Some(kind),
                Some(company),
                Some(from),
                Some(to),
                Some(departure_time),
                Some(arrival_time),
            ) => Ok(NewTransportLeg {
                kind,
                company,
                from,
                to,
                departure_time,
                arrival_time,
                trip_id,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormState;
    use chrono::NaiveDate;

    #[test]
    fn test_trip_form_builds_draft_for_owner() {
        let mut form = FormState::with_model(TripForm::for_user(Some(7)));
        form.set("destination", "Berat").unwrap();
        form.set("startDate", "2025-06-01").unwrap();
        form.set("endDate", "2025-06-03").unwrap();
        let draft = form.submit().unwrap();
        assert_eq!(draft.user_id, 7);
        assert_eq!(draft.end_date, NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
    }

    #[test]
    fn test_trip_form_rejects_reversed_dates() {
        let mut form = FormState::with_model(TripForm::for_user(Some(7)))
            .with("destination", "Berat")
            .unwrap()
            .with("startDate", "2025-06-05")
            .unwrap()
            .with("endDate", "2025-06-03")
            .unwrap();
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("endDate"), Some("must not be before the start date"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_trip_form_without_user() {
        let mut form = FormState::<TripForm>::new();
        let errors = form.submit().unwrap_err();
        assert!(errors.get("userId").is_some());
        assert_eq!(errors.get("destination"), Some("is required"));
    }

    #[test]
    fn test_activity_form_without_trip_never_validates() {
        let mut form = FormState::with_model(ActivityForm::for_trip(None))
            .with("name", "Castle tour")
            .unwrap()
            .with("location", "Berat")
            .unwrap()
            .with("date", "2025-06-02")
            .unwrap()
            .with("time", "10:30")
            .unwrap()
            .with("category", "Sightseeing")
            .unwrap()
            .with("price", "12")
            .unwrap()
            .with("rating", "5")
            .unwrap();
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("tripId"), Some(NO_TRIP));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_activity_form_reset_keeps_trip() {
        let mut form = FormState::with_model(ActivityForm::for_trip(Some(3)));
        form.set("name", "Hike").unwrap();
        assert!(form.is_dirty());
        form.reset();
        assert!(!form.is_dirty());
        assert_eq!(form.value("name"), Some(""));
        let errors = form.submit().unwrap_err();
        assert!(errors.get("tripId").is_none());
    }

    #[test]
    fn test_accommodation_form_splits_amenities() {
        let mut form = FormState::with_model(AccommodationForm::for_trip(Some(3)));
        for (field, value) in [
            ("name", "Hotel Dajti"),
            ("location", "Tirana"),
            ("price", "80"),
            ("rating", "4"),
            ("type", "Hotel"),
            ("amenities", "WiFi, Pool, ,Parking"),
            ("checkIn", "2025-06-01"),
            ("checkOut", "2025-06-04"),
        ] {
            form.set(field, value).unwrap();
        }
        let draft = form.submit().unwrap();
        assert_eq!(draft.amenities, vec!["WiFi", "Pool", "Parking"]);
        assert_eq!(draft.description, "");
        assert_eq!(draft.trip_id, 3);
    }

    #[test]
    fn test_transport_form_checks_arrival_after_departure() {
        let mut form = FormState::with_model(TransportForm::for_trip(Some(3)));
        for (field, value) in [
            ("type", "Bus"),
            ("company", "Albtransport"),
            ("from", "Tirana"),
            ("to", "Sarandë"),
            ("departureTime", "2025-06-05T08:00"),
            ("arrivalTime", "2025-06-05T07:00"),
        ] {
            form.set(field, value).unwrap();
        }
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("arrivalTime"), Some("must not be before departure"));

        form.set("arrivalTime", "2025-06-05T13:30").unwrap();
        let draft = form.submit().unwrap();
        assert_eq!(draft.from, "Tirana");
    }
}
