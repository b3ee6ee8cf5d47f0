//! # Planner
//!
//! The application facade. It owns one of each client-layer component and
//! exposes the page-level workflows: signing in and out, reading each
//! resource through the query cache, and writing through cache mutations
//! that invalidate the affected lists.

use std::sync::Arc;

use shared::{
    config::ClientConfig,
    models::{
        Accommodation, AccommodationId, AccommodationUpdate, Activity, ActivityId, ActivityUpdate,
        AuthScheme, AuthenticatedUser, Credential, CurrentWeather, Forecast, LoginRequest,
        NewAccommodation, NewActivity, NewTransportLeg, NewTrip, ProfileUpdate, RegisterRequest,
        Session, TransportId, TransportLeg, TransportUpdate, Trip, TripId, TripUpdate, UserProfile,
        WeatherQuery,
    },
};

use crate::{
    api::{
        Accommodations, Activities, AuthApi, ProfileApi, Resource, ResourceClient, Transports,
        Trips, WeatherApi,
    },
    error::ClientResult,
    guard::{GuardDecision, HOME_PATH, RouteGuard, post_login_destination, return_to_from},
    http::ApiClient,
    navigation::{MemoryHistory, Navigator},
    query::{QueryClient, QueryKey, QueryOptions, QueryState},
    session::{AuthState, SessionStore},
    storage::{FileStorage, KeyValueStore, MemoryStorage},
    transport::{HttpTransport, ReqwestTransport},
};

/// Cache keys for every read the planner makes.
pub mod keys {
    use crate::query::QueryKey;
    use shared::models::{TripId, UserId, WeatherQuery};

    /// A user's trip list.
    #[must_use]
    pub fn trips(user_id: UserId) -> QueryKey {
        QueryKey::new("trips").with(user_id)
    }

    /// One trip. Lives under `trips` so list invalidation reaches it.
    #[must_use]
    pub fn trip(id: TripId) -> QueryKey {
        QueryKey::new("trips").with("detail").with(id)
    }

    /// A child list key; `None` means no trip is selected.
    #[must_use]
    pub fn by_trip(root: &str, trip_id: Option<TripId>) -> QueryKey {
        match trip_id {
            Some(id) => QueryKey::new(root).with(id),
            None => QueryKey::new(root).with("none"),
        }
    }

    /// Current conditions, keyed case-insensitively by city.
    #[must_use]
    pub fn current_weather(query: &WeatherQuery) -> QueryKey {
        QueryKey::new("weather")
            .with("current")
            .with(query.city().to_lowercase())
    }

    /// A forecast for one city and length.
    #[must_use]
    pub fn forecast(query: &WeatherQuery) -> QueryKey {
        QueryKey::new("weather")
            .with("forecast")
            .with(query.city().to_lowercase())
            .with(query.days())
    }

    /// The signed-in user's profile.
    #[must_use]
    pub fn profile() -> QueryKey {
        QueryKey::new("profile")
    }
}

/// Session store, query cache, navigator and every resource client,
/// wired to one backend.
#[derive(Debug)]
pub struct Planner {
    api: ApiClient,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    cache: QueryClient,
    scheme: AuthScheme,
    auth: AuthApi,
    trips: ResourceClient<Trips>,
    activities: ResourceClient<Activities>,
    accommodations: ResourceClient<Accommodations>,
    transports: ResourceClient<Transports>,
    weather: WeatherApi,
    profile: ProfileApi,
}

impl Planner {
    /// Wires a planner over an arbitrary transport.
    pub fn with_transport(
        base_url: &str,
        scheme: AuthScheme,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(storage));
        let api = ApiClient::new(base_url, transport, session.clone(), navigator.clone());
        Self {
            session,
            navigator,
            cache: QueryClient::new(),
            scheme,
            auth: AuthApi::new(api.clone()),
            trips: ResourceClient::new(api.clone()),
            activities: ResourceClient::new(api.clone()),
            accommodations: ResourceClient::new(api.clone()),
            transports: ResourceClient::new(api.clone()),
            weather: WeatherApi::new(api.clone()),
            profile: ProfileApi::new(api.clone()),
            api,
        }
    }

    /// Builds a planner from configuration: reqwest transport, file-backed
    /// session storage (in-memory if no location is known), in-memory history.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout())?);
        let storage: Arc<dyn KeyValueStore> = match config.session_file() {
            Some(path) => Arc::new(FileStorage::open(path)),
            None => {
                tracing::warn!("no configuration directory; session will not persist");
                Arc::new(MemoryStorage::new())
            }
        };
        Ok(Self::with_transport(
            &config.api_url,
            config.auth_scheme,
            transport,
            storage,
            Arc::new(MemoryHistory::new()),
        ))
    }

    /// The HTTP adapter every client shares.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The session store.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// The query cache.
    #[must_use]
    pub fn cache(&self) -> &QueryClient {
        &self.cache
    }

    /// Where the planner navigates on login, logout and expiry.
    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Uncached access to `/trips`.
    #[must_use]
    pub fn trips_client(&self) -> &ResourceClient<Trips> {
        &self.trips
    }

    /// Uncached access to `/activities`.
    #[must_use]
    pub fn activities_client(&self) -> &ResourceClient<Activities> {
        &self.activities
    }

    /// Uncached access to `/accommodations`.
    #[must_use]
    pub fn accommodations_client(&self) -> &ResourceClient<Accommodations> {
        &self.accommodations
    }

    /// Uncached access to `/transports`.
    #[must_use]
    pub fn transports_client(&self) -> &ResourceClient<Transports> {
        &self.transports
    }

    /// Reads the persisted session. Safe to call more than once.
    pub fn hydrate(&self) -> AuthState {
        self.session.hydrate()
    }

    /// What [`RouteGuard`] decides for `location` right now.
    #[must_use]
    pub fn guard(&self, location: &str) -> GuardDecision {
        RouteGuard::can_enter(&self.session.state(), location)
    }

    /// Navigates to `location` if the guard allows it, or wherever the guard
    /// redirects. Nothing happens while auth state is still unknown.
    pub fn visit(&self, location: &str) -> GuardDecision {
        let decision = self.guard(location);
        match &decision {
            GuardDecision::Allow => self.navigator.navigate(location),
            GuardDecision::Redirect { .. } => {
                if let Some(target) = decision.location() {
                    self.navigator.navigate(&target);
                }
            }
            GuardDecision::Pending => {}
        }
        decision
    }

    /// Validates credentials, stores the session, and navigates to the
    /// preserved return path (or home).
    ///
    /// With [`AuthScheme::Basic`] the credential is checked via `GET /auth/check`;
    /// with [`AuthScheme::Bearer`] a token is requested from `POST /auth/login`.
    ///
    /// # Errors
    /// [`ClientError::Unauthorized`](crate::error::ClientError::Unauthorized)
    /// for rejected credentials; transport, server or storage errors otherwise.
    pub async fn login(
        &self,
        request: &LoginRequest,
        return_to: Option<&str>,
    ) -> ClientResult<AuthenticatedUser> {
        let basic = Credential::basic(&request.email, &request.password);
        let response = match self.scheme {
            AuthScheme::Basic => self.auth.check(&basic).await?,
            AuthScheme::Bearer => self.auth.login(request).await?,
        };
        let session = Session::from_login(&response, basic);
        let user = session.user.clone();
        self.session.login(session)?;
        self.cache.clear();

        let preserved = return_to
            .map(str::to_string)
            .or_else(|| return_to_from(&self.navigator.current()));
        let destination = post_login_destination(preserved.as_deref());
        self.navigator.navigate(&destination);
        Ok(user)
    }

    /// Creates an account and signs straight into it.
    ///
    /// # Errors
    /// As [`Planner::login`], plus registration failures such as a taken email.
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthenticatedUser> {
        self.auth.register(request).await?;
        tracing::info!(email = %request.email, "registered");
        let login = LoginRequest {
            email: request.email.clone(),
            password: request.password.clone(),
        };
        self.login(&login, None).await
    }

    /// Signs out, forgets every cached read, and returns home.
    pub fn logout(&self) {
        if let Err(err) = self.session.logout() {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
        self.cache.clear();
        self.navigator.navigate(HOME_PATH);
    }

    async fn list_by_trip<R>(
        &self,
        client: &ResourceClient<R>,
        trip_id: Option<TripId>,
    ) -> QueryState<Vec<R::Item>>
    where
        R: Resource<Scope = TripId>,
    {
        let client = client.clone();
        let scope = trip_id.unwrap_or_default();
        self.cache
            .query(
                keys::by_trip(R::NAME, trip_id),
                move || {
                    let client = client.clone();
                    async move { client.list(&scope).await }
                },
                QueryOptions::enabled_if(trip_id.is_some()),
            )
            .await
    }

    async fn create<R: Resource>(
        &self,
        client: &ResourceClient<R>,
        draft: &R::Draft,
    ) -> ClientResult<R::Item> {
        self.cache
            .mutate(client.create(draft), &[QueryKey::new(R::NAME)])
            .await
    }

    async fn update<R: Resource>(
        &self,
        client: &ResourceClient<R>,
        id: &R::Id,
        patch: &R::Patch,
    ) -> ClientResult<R::Item> {
        self.cache
            .mutate(client.update(id, patch), &[QueryKey::new(R::NAME)])
            .await
    }

    async fn remove<R: Resource>(&self, client: &ResourceClient<R>, id: &R::Id) -> ClientResult<()> {
        self.cache
            .mutate(client.remove(id), &[QueryKey::new(R::NAME)])
            .await
    }

    /// The signed-in user's trips.
    ///
    /// # Errors
    /// [`ClientError::NotAuthenticated`](crate::error::ClientError::NotAuthenticated)
    /// when nobody is signed in; no request is made in that case.
    pub async fn trips(&self) -> ClientResult<QueryState<Vec<Trip>>> {
        let user_id = self.session.require_user()?.id;
        let client = self.trips.clone();
        Ok(self
            .cache
            .query(
                keys::trips(user_id),
                move || {
                    let client = client.clone();
                    async move { client.list(&user_id).await }
                },
                QueryOptions::default(),
            )
            .await)
    }

    /// One trip by id.
    pub async fn trip(&self, id: TripId) -> QueryState<Trip> {
        let client = self.trips.clone();
        self.cache
            .query(
                keys::trip(id),
                move || {
                    let client = client.clone();
                    async move { client.get(&id).await }
                },
                QueryOptions::default(),
            )
            .await
    }

    /// # Errors
    /// Propagates the create failure; the cache is untouched in that case.
    pub async fn create_trip(&self, draft: &NewTrip) -> ClientResult<Trip> {
        self.create(&self.trips, draft).await
    }

    /// # Errors
    /// Propagates the update failure.
    pub async fn update_trip(&self, id: TripId, patch: &TripUpdate) -> ClientResult<Trip> {
        self.update(&self.trips, &id, patch).await
    }

    /// # Errors
    /// Propagates the delete failure.
    pub async fn delete_trip(&self, id: TripId) -> ClientResult<()> {
        self.remove(&self.trips, &id).await
    }

    /// Activities of the selected trip. With no trip selected nothing is fetched.
    pub async fn activities(&self, trip_id: Option<TripId>) -> QueryState<Vec<Activity>> {
        self.list_by_trip(&self.activities, trip_id).await
    }

    /// # Errors
    /// Propagates the create failure.
    pub async fn add_activity(&self, draft: &NewActivity) -> ClientResult<Activity> {
        self.create(&self.activities, draft).await
    }

    /// # Errors
    /// Propagates the update failure.
    pub async fn update_activity(
        &self,
        id: ActivityId,
        patch: &ActivityUpdate,
    ) -> ClientResult<Activity> {
        self.update(&self.activities, &id, patch).await
    }

    /// # Errors
    /// Propagates the delete failure.
    pub async fn delete_activity(&self, id: ActivityId) -> ClientResult<()> {
        self.remove(&self.activities, &id).await
    }

    /// Accommodations of the selected trip. Nothing is fetched without a selection.
    pub async fn accommodations(&self, trip_id: Option<TripId>) -> QueryState<Vec<Accommodation>> {
        self.list_by_trip(&self.accommodations, trip_id).await
    }

    /// # Errors
    /// Propagates the create failure.
    pub async fn add_accommodation(&self, draft: &NewAccommodation) -> ClientResult<Accommodation> {
        self.create(&self.accommodations, draft).await
    }

    /// # Errors
    /// Propagates the update failure.
    pub async fn update_accommodation(
        &self,
        id: AccommodationId,
        patch: &AccommodationUpdate,
    ) -> ClientResult<Accommodation> {
        self.update(&self.accommodations, &id, patch).await
    }

    /// # Errors
    /// Propagates the delete failure.
    pub async fn delete_accommodation(&self, id: AccommodationId) -> ClientResult<()> {
        self.remove(&self.accommodations, &id).await
    }

    /// Transport legs of the selected trip. Nothing is fetched without a selection.
    pub async fn transport(&self, trip_id: Option<TripId>) -> QueryState<Vec<TransportLeg>> {
        self.list_by_trip(&self.transports, trip_id).await
    }

    /// # Errors
    /// Propagates the create failure.
    pub async fn add_transport(&self, draft: &NewTransportLeg) -> ClientResult<TransportLeg> {
        self.create(&self.transports, draft).await
    }

    /// # Errors
    /// Propagates the update failure.
    pub async fn update_transport(
        &self,
        id: TransportId,
        patch: &TransportUpdate,
    ) -> ClientResult<TransportLeg> {
        self.update(&self.transports, &id, patch).await
    }

    /// # Errors
    /// Propagates the delete failure.
    pub async fn delete_transport(&self, id: TransportId) -> ClientResult<()> {
        self.remove(&self.transports, &id).await
    }

    /// Current conditions. The query is checked up front, so a fetch only
    /// fails for network or server reasons.
    pub async fn current_weather(&self, query: &WeatherQuery) -> QueryState<CurrentWeather> {
        let weather = self.weather.clone();
        let owned = query.clone();
        self.cache
            .query(
                keys::current_weather(query),
                move || {
                    let weather = weather.clone();
                    let query = owned.clone();
                    async move { weather.current(&query).await }
                },
                QueryOptions::default(),
            )
            .await
    }

    /// Daily forecast for [`WeatherQuery::days`] days.
    pub async fn forecast(&self, query: &WeatherQuery) -> QueryState<Forecast> {
        let weather = self.weather.clone();
        let owned = query.clone();
        self.cache
            .query(
                keys::forecast(query),
                move || {
                    let weather = weather.clone();
                    let query = owned.clone();
                    async move { weather.forecast(&query).await }
                },
                QueryOptions::default(),
            )
            .await
    }

    /// The signed-in user's profile. Disabled while signed out.
    pub async fn profile(&self) -> QueryState<UserProfile> {
        let profile = self.profile.clone();
        self.cache
            .query(
                keys::profile(),
                move || {
                    let profile = profile.clone();
                    async move { profile.get().await }
                },
                QueryOptions::enabled_if(self.session.is_authenticated()),
            )
            .await
    }

    /// # Errors
    /// Propagates the update failure.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        self.cache
            .mutate(self.profile.update(update), &[keys::profile()])
            .await
    }
}
