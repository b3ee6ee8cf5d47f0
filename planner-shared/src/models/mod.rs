//! Wire models for the planner REST API. Field names follow the
//! backend's camelCase JSON.

/// Places to stay.
pub mod accommodation;
/// Things to do on a given day.
pub mod activity;
/// The backend's error body.
pub mod errors;
pub mod serde_helpers;
/// Credentials and the signed-in session.
pub mod session;
/// Legs of travel between places.
pub mod transport;
/// Trips, the root of every itinerary.
pub mod trip;
/// Accounts, login and profile payloads.
pub mod user;
/// Current conditions and forecasts.
pub mod weather;

pub use accommodation::{Accommodation, AccommodationId, AccommodationUpdate, NewAccommodation};
pub use activity::{Activity, ActivityId, ActivityUpdate, NewActivity};
pub use errors::{ErrorResponse, GENERIC_FAILURE_MESSAGE};
pub use session::{AuthScheme, Credential, Session};
pub use transport::{NewTransportLeg, TransportId, TransportLeg, TransportUpdate};
pub use trip::{NewTrip, Trip, TripId, TripUpdate};
pub use user::{
    AuthenticatedUser, LoginRequest, LoginResponse, Preferences, ProfileUpdate, RegisterRequest,
    UserId, UserProfile, UserRole,
};
pub use weather::{CurrentWeather, DEFAULT_FORECAST_DAYS, DailyForecast, Forecast, WeatherQuery};
