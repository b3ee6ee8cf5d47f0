use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::user::{AuthenticatedUser, LoginResponse};

/// How the client authenticates requests once a session exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Basic base64(email:password)`, validated via `GET /auth/check`.
    #[default]
    Basic,
    /// `Authorization: Bearer <token>`, issued by `POST /auth/login`.
    Bearer,
}

impl AuthScheme {
    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Bearer => "bearer",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthScheme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "bearer" => Ok(Self::Bearer),
            other => Err(format!("unknown auth scheme '{other}' (expected basic or bearer)")),
        }
    }
}

/// A credential attached to authenticated requests.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Base64-encoded `email:password`.
    Basic(String),
    /// Opaque bearer token.
    Bearer(String),
}

impl Credential {
    /// Encodes an email/password pair as a Basic credential.
    #[must_use]
    pub fn basic(email: &str, password: &str) -> Self {
        Self::Basic(STANDARD.encode(format!("{email}:{password}")))
    }

    /// The scheme this credential belongs to.
    #[must_use]
    pub fn scheme(&self) -> AuthScheme {
        match self {
            Self::Basic(_) => AuthScheme::Basic,
            Self::Bearer(_) => AuthScheme::Bearer,
        }
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        match self {
            Self::Basic(encoded) => format!("Basic {encoded}"),
            Self::Bearer(token) => format!("Bearer {token}"),
        }
    }

    /// Parses a persisted credential.
    ///
    /// Accepts `"Basic <b64>"` and `"Bearer <token>"`. A bare value without a
    /// scheme prefix is read as Basic, which is how older clients stored it.
    #[must_use]
    pub fn parse(stored: &str) -> Option<Self> {
        let stored = stored.trim();
        if stored.is_empty() {
            return None;
        }
        let (scheme, rest) = match stored.split_once(' ') {
            Some((scheme, rest)) => (scheme, rest.trim()),
            None => return Some(Self::Basic(stored.to_string())),
        };
        if rest.is_empty() {
            return None;
        }
        match scheme.to_ascii_lowercase().as_str() {
            "basic" => Some(Self::Basic(rest.to_string())),
            "bearer" => Some(Self::Bearer(rest.to_string())),
            _ => None,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(_) => f.write_str("Credential::Basic(<redacted>)"),
            Self::Bearer(_) => f.write_str("Credential::Bearer(<redacted>)"),
        }
    }
}

/// A complete client session: who is signed in and how to prove it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Who is signed in.
    pub user: AuthenticatedUser,
    /// Proof attached to every request.
    pub credential: Credential,
}

impl Session {
    /// Pairs a user with their credential.
    #[must_use]
    pub fn new(user: AuthenticatedUser, credential: Credential) -> Self {
        Self { user, credential }
    }

    /// Builds a session from a successful login response.
    ///
    /// A token in the response wins; otherwise the Basic credential that was
    /// just validated is kept.
    #[must_use]
    pub fn from_login(response: &LoginResponse, fallback: Credential) -> Self {
        let credential = response
            .token
            .as_ref()
            .filter(|token| !token.trim().is_empty())
            .map_or(fallback, |token| Credential::Bearer(token.clone()));
        Self::new(response.user(), credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    fn response(token: Option<&str>) -> LoginResponse {
        LoginResponse {
            message: None,
            user_id: 7,
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            role: UserRole::User,
            token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_basic_credential_encoding() {
        let credential = Credential::basic("a@b.com", "x");
        assert_eq!(credential, Credential::Basic("YUBiLmNvbTp4".to_string()));
        assert_eq!(credential.header_value(), "Basic YUBiLmNvbTp4");
        assert_eq!(credential.scheme(), AuthScheme::Basic);
    }

    #[test]
    fn test_parse_round_trips_header_values() {
        let basic = Credential::basic("a@b.com", "x");
        assert_eq!(Credential::parse(&basic.header_value()), Some(basic));

        let bearer = Credential::Bearer("tok".to_string());
        assert_eq!(Credential::parse(&bearer.header_value()), Some(bearer));
    }

    #[test]
    fn test_parse_bare_value_as_basic() {
        assert_eq!(
            Credential::parse("YUBiLmNvbTp4"),
            Some(Credential::Basic("YUBiLmNvbTp4".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Credential::parse(""), None);
        assert_eq!(Credential::parse("Bearer "), None);
        assert_eq!(Credential::parse("Digest abc"), None);
    }

    #[test]
    fn test_debug_never_leaks_secret() {
        let debug = format!("{:?}", Credential::basic("a@b.com", "hunter2"));
        assert!(!debug.contains("YUBi"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_session_prefers_issued_token() {
        let session = Session::from_login(&response(Some("jwt")), Credential::basic("a@b.com", "x"));
        assert_eq!(session.credential, Credential::Bearer("jwt".to_string()));
        assert_eq!(session.user.id, 7);
    }

    #[test]
    fn test_session_keeps_basic_without_token() {
        let fallback = Credential::basic("a@b.com", "x");
        let session = Session::from_login(&response(None), fallback.clone());
        assert_eq!(session.credential, fallback);
    }

    #[test]
    fn test_auth_scheme_parsing() {
        assert_eq!("Bearer".parse::<AuthScheme>(), Ok(AuthScheme::Bearer));
        assert!("digest".parse::<AuthScheme>().is_err());
    }
}
