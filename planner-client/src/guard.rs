use std::fmt;

use url::form_urlencoded;

use crate::{navigation::path_of, session::AuthState};

/// Landing page.
pub const HOME_PATH: &str = "/";
/// Login page; the target of every auth redirect.
pub const LOGIN_PATH: &str = "/login";
/// Registration page.
pub const REGISTER_PATH: &str = "/register";
/// Query parameter carrying the page to return to after login.
pub const RETURN_TO_PARAM: &str = "returnTo";

/// The application's pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppRoute {
    /// `/`
    Home,
    /// `/login`
    Login,
    /// `/register`
    Register,
    /// `/trips`
    Trips,
    /// `/activities`
    Activities,
    /// `/accommodations`
    Accommodations,
    /// `/transport`
    Transport,
    /// `/weather`
    Weather,
    /// `/profile`
    Profile,
    /// Any other path.
    NotFound,
}

impl AppRoute {
    /// Every route, in navigation order.
    pub const ALL: [AppRoute; 10] = [
        Self::Home,
        Self::Login,
        Self::Register,
        Self::Trips,
        Self::Activities,
        Self::Accommodations,
        Self::Transport,
        Self::Weather,
        Self::Profile,
        Self::NotFound,
    ];

    /// Resolves a location (query string ignored, trailing slash tolerated).
    #[must_use]
    pub fn from_path(location: &str) -> Self {
        let path = path_of(location);
        let trimmed = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        match trimmed {
            "/" => Self::Home,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/trips" => Self::Trips,
            "/activities" => Self::Activities,
            "/accommodations" => Self::Accommodations,
            "/transport" => Self::Transport,
            "/weather" => Self::Weather,
            "/profile" => Self::Profile,
            _ => Self::NotFound,
        }
    }

    /// Canonical path. [`AppRoute::NotFound`] reports `/404`.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => HOME_PATH,
            Self::Login => LOGIN_PATH,
            Self::Register => REGISTER_PATH,
            Self::Trips => "/trips",
            Self::Activities => "/activities",
            Self::Accommodations => "/accommodations",
            Self::Transport => "/transport",
            Self::Weather => "/weather",
            Self::Profile => "/profile",
            Self::NotFound => "/404",
        }
    }

    /// Pages that need a signed-in user.
    #[must_use]
    pub fn requires_auth(self) -> bool {
        matches!(
            self,
            Self::Trips
                | Self::Activities
                | Self::Accommodations
                | Self::Transport
                | Self::Weather
                | Self::Profile
        )
    }

    /// Login and registration, which a signed-in user has no reason to see.
    #[must_use]
    pub fn is_auth_page(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

impl fmt::Display for AppRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of checking a location against the auth state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the page.
    Allow,
    /// Auth state is still unknown; show a loading indicator.
    Pending,
    /// Send the visitor elsewhere.
    Redirect {
        /// Destination path.
        to: String,
        /// Page to come back to after signing in.
        return_to: Option<String>,
    },
}

impl GuardDecision {
    /// The location to navigate to, with the return path encoded as a query parameter.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Redirect {
                to,
                return_to: Some(return_to),
            } => Some(format!(
                "{to}?{}",
                form_urlencoded::Serializer::new(String::new())
                    .append_pair(RETURN_TO_PARAM, return_to)
                    .finish()
            )),
            Self::Redirect { to, .. } => Some(to.clone()),
            _ => None,
        }
    }
}

/// Stateless access rules for [`AppRoute`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    /// Decides whether the visitor may see `location`.
    #[must_use]
    pub fn can_enter(state: &AuthState, location: &str) -> GuardDecision {
        let route = AppRoute::from_path(location);
        match state {
            AuthState::Unknown => GuardDecision::Pending,
            AuthState::Unauthenticated if route.requires_auth() => GuardDecision::Redirect {
                to: LOGIN_PATH.to_string(),
                return_to: Some(location.to_string()),
            },
            AuthState::Authenticated(_) if route.is_auth_page() => GuardDecision::Redirect {
                to: HOME_PATH.to_string(),
                return_to: None,
            },
            _ => GuardDecision::Allow,
        }
    }
}

/// Reads the return path from a login location such as `/login?returnTo=%2Ftrips`.
#[must_use]
pub fn return_to_from(location: &str) -> Option<String> {
    let (_, query) = location.split_once('?')?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == RETURN_TO_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Where to go after a successful login. Only in-app paths are honoured,
/// and never the login or registration pages themselves.
#[must_use]
pub fn post_login_destination(return_to: Option<&str>) -> String {
    return_to
        .map(str::trim)
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .filter(|path| !AppRoute::from_path(path).is_auth_page())
        .map_or_else(|| HOME_PATH.to_string(), str::to_string)
}
