use super::{FormModel, ValidationErrors, optional};
use crate::models::WeatherQuery;

/// City search box plus an optional forecast length.
#[derive(Debug, Clone, Default)]
pub struct WeatherForm {
    city: String,
    days: String,
}

impl FormModel for WeatherForm {
    type Output = WeatherQuery;

    const FIELDS: &'static [&'static str] = &["city", "days"];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "city" => self.city = value,
            "days" => self.days = value,
            _ => return false,
        }
        true
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "city" => Some(&self.city),
            "days" => Some(&self.days),
            _ => None,
        }
    }

    fn validate(&self) -> Result<WeatherQuery, ValidationErrors> {
        let days = match optional(&self.days) {
            Some(raw) => match raw.parse::<u8>() {
                Ok(days) => Some(days),
                Err(_) => {
                    let mut errors = WeatherQuery::new(&self.city, None)
                        .err()
                        .unwrap_or_default();
                    errors.add("days", "must be a whole number of days");
                    return Err(errors);
                }
            },
            None => None,
        };
        WeatherQuery::new(&self.city, days)
    }
}
