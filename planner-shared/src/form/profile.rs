use super::{FormModel, ValidationErrors, optional};
use crate::models::{Preferences, ProfileUpdate};

/// Partial profile edit. Blank fields are left unchanged on the server.
///
/// Preferences travel as one object: setting any of them sends all three,
/// with `base` supplying the ones left blank.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    base: Preferences,
    name: String,
    phone: String,
    address: String,
    language: String,
    currency: String,
    notifications: String,
}

impl ProfileForm {
    /// Starts from the preferences currently stored on the profile.
    #[must_use]
    pub fn with_preferences(base: Option<Preferences>) -> Self {
        Self {
            base: base.unwrap_or_default(),
            ..Self::default()
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl FormModel for ProfileForm {
    type Output = ProfileUpdate;

    const FIELDS: &'static [&'static str] = &[
        "name",
        "phone",
        "address",
        "language",
        "currency",
        "notifications",
    ];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "phone" => &mut self.phone,
            "address" => &mut self.address,
            "language" => &mut self.language,
            "currency" => &mut self.currency,
            "notifications" => &mut self.notifications,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn field(&self, field: &str) -> Option<&str> {
        let value = match field {
            "name" => &self.name,
            "phone" => &self.phone,
            "address" => &self.address,
            "language" => &self.language,
            "currency" => &self.currency,
            "notifications" => &self.notifications,
            _ => return None,
        };
        Some(value)
    }

    fn validate(&self) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let language = optional(&self.language);
        let currency = optional(&self.currency).map(|c| c.to_ascii_uppercase());
        let notifications = match optional(&self.notifications) {
            Some(raw) => {
                let flag = parse_flag(&raw);
                if flag.is_none() {
                    errors.add("notifications", "must be true or false");
                }
                flag
            }
            None => None,
        };
        if let Some(code) = &currency {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                errors.add("currency", "must be a three-letter currency code");
            }
        }

        let preferences = (language.is_some() || currency.is_some() || notifications.is_some())
            .then(|| Preferences {
                language: language.unwrap_or_else(|| self.base.language.clone()),
                currency: currency.unwrap_or_else(|| self.base.currency.clone()),
                notifications: notifications.unwrap_or(self.base.notifications),
            });
        let update = ProfileUpdate {
            name: optional(&self.name),
            phone: optional(&self.phone),
            address: optional(&self.address),
            preferences,
        };
        if errors.is_empty() && update.is_empty() {
            errors.add("profile", "nothing to update");
        }
        errors.into_result(|| update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormState;

    #[test]
    fn test_empty_profile_form_is_rejected() {
        let mut form = FormState::<ProfileForm>::new();
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("profile"), Some("nothing to update"));
    }

    #[test]
    fn test_partial_preferences_fill_from_base() {
        let base = Preferences {
            language: "sq".to_string(),
            currency: "ALL".to_string(),
            notifications: false,
        };
        let mut form = FormState::with_model(ProfileForm::with_preferences(Some(base)));
        form.set("currency", "eur").unwrap();
        form.set("phone", " +355 69 000 0000 ").unwrap();
        let update = form.submit().unwrap();
        let preferences = update.preferences.unwrap();
        assert_eq!(preferences.currency, "EUR");
        assert_eq!(preferences.language, "sq");
        assert!(!preferences.notifications);
        assert_eq!(update.phone.as_deref(), Some("+355 69 000 0000"));
        assert!(update.name.is_none());
    }

    #[test]
    fn test_bad_notification_flag() {
        let mut form = FormState::<ProfileForm>::new();
        form.set("notifications", "sometimes").unwrap();
        form.set("currency", "euro").unwrap();
        let errors = form.submit().unwrap_err();
        assert!(errors.get("notifications").is_some());
        assert!(errors.get("currency").is_some());
        assert!(errors.get("profile").is_none());
    }
}
