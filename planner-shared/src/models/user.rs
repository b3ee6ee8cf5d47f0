use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Backend identifier of a user account.
pub type UserId = i64;

/// Global role assignments for a user account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Regular traveller account.
    #[default]
    User,
    /// Administrator account.
    Admin,
}

impl UserRole {
    /// Return the canonical string representation used on the wire and in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err("unknown user role"),
        }
    }
}

/// The signed-in user as known to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Backend user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Account role.
    pub role: UserRole,
}

/// Credentials submitted by the login form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plain-text password. Never persisted.
    pub password: String,
}

/// Body returned by `GET /auth/check` and `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Informational message such as `"Login successful"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Backend user id.
    pub user_id: UserId,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: UserRole,
    /// Bearer token, present only when the backend issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl LoginResponse {
    /// The user described by this response.
    #[must_use]
    pub fn user(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.user_id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Account registration payload. New accounts always register as `USER`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Always [`UserRole::User`] from this client.
    pub role: UserRole,
}

/// Per-user display preferences stored with the profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
    /// UI language code, e.g. `en`.
    pub language: String,
    /// Three-letter currency code used for prices.
    pub currency: String,
    /// Whether the user wants notifications.
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            currency: "EUR".to_string(),
            notifications: true,
        }
    }
}

/// Profile returned by `GET /users/profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Backend user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Stored preferences, if the user ever saved any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

/// Partial profile sent to `PUT /users/profile`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Replacement preferences, sent as a whole.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

impl ProfileUpdate {
    /// True when the update would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.preferences.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_as_uppercase() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
        let role: UserRole = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, UserRole::User);
    }

    #[test]
    fn test_role_from_str_is_case_insensitive() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!(" User ".parse::<UserRole>(), Ok(UserRole::User));
        assert!("GUEST".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_login_response_from_check_endpoint() {
        let json = r#"{"userId":7,"name":"A","email":"a@b.com","role":"USER"}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.user_id, 7);
        assert!(response.token.is_none());
        assert_eq!(
            response.user(),
            AuthenticatedUser {
                id: 7,
                name: "A".to_string(),
                email: "a@b.com".to_string(),
                role: UserRole::User,
            }
        );
    }

    #[test]
    fn test_login_response_with_token() {
        let json = r#"{"message":"Login successful","userId":1,"name":"Admin","email":"admin@admin.com","role":"ADMIN","token":"eyJ"}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.token.as_deref(), Some("eyJ"));
        assert_eq!(response.message.as_deref(), Some("Login successful"));
    }

    #[test]
    fn test_profile_update_serializes_only_present_fields() {
        let update = ProfileUpdate {
            phone: Some("+355 69 000 0000".to_string()),
            ..ProfileUpdate::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"phone":"+355 69 000 0000"}"#
        );
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_profile_without_optional_fields() {
        let json = r#"{"id":3,"name":"Era","email":"era@example.com"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert!(profile.phone.is_none());
        assert!(profile.preferences.is_none());
    }
}
