//! # Resource clients
//!
//! One typed client per backend resource. They map operations to REST paths
//! and payloads and nothing more: no caching, no shared state. Cache updates
//! happen through [`QueryClient::mutate`](crate::query::QueryClient::mutate)
//! invalidation in [`Planner`](crate::app::Planner).

mod auth;
mod profile;
mod resources;
mod weather;

pub use auth::AuthApi;
pub use profile::ProfileApi;
pub use resources::{Accommodations, Activities, Transports, Trips};
pub use weather::WeatherApi;

use std::{fmt, marker::PhantomData};

use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::{error::ClientResult, http::ApiClient};

/// A CRUD resource exposed by the backend.
pub trait Resource: Send + Sync + 'static {
    /// Backend identifier of one item.
    type Id: fmt::Display + Send + Sync;
    /// What lists are scoped by: the owning user or trip.
    type Scope: fmt::Display + Send + Sync;
    /// What the backend returns.
    type Item: DeserializeOwned + Send + Sync + 'static;
    /// Create payload.
    type Draft: Serialize + Send + Sync;
    /// Partial update payload.
    type Patch: Serialize + Send + Sync;

    /// Resource name; also the root of its cache keys.
    const NAME: &'static str;

    /// Path of the list for `scope`, relative to the API base.
    fn list_path(scope: &Self::Scope) -> String;
    /// Path of one item.
    fn item_path(id: &Self::Id) -> String;
    /// Path that accepts create requests.
    fn create_path() -> &'static str;
}

/// Typed CRUD for one [`Resource`].
pub struct ResourceClient<R> {
    api: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("resource", &R::NAME)
            .finish_non_exhaustive()
    }
}

impl<R: Resource> ResourceClient<R> {
    /// A client over `api`.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    /// # Errors
    /// Propagates [`ApiClient`] errors.
    pub async fn list(&self, scope: &R::Scope) -> ClientResult<Vec<R::Item>> {
        self.api.get_json(&R::list_path(scope)).await
    }

    /// # Errors
    /// Propagates [`ApiClient`] errors.
    pub async fn get(&self, id: &R::Id) -> ClientResult<R::Item> {
        self.api.get_json(&R::item_path(id)).await
    }

    /// # Errors
    /// Propagates [`ApiClient`] errors.
    pub async fn create(&self, draft: &R::Draft) -> ClientResult<R::Item> {
        self.api.post_json(R::create_path(), draft).await
    }

    /// # Errors
    /// Propagates [`ApiClient`] errors.
    pub async fn update(&self, id: &R::Id, patch: &R::Patch) -> ClientResult<R::Item> {
        self.api.put_json(&R::item_path(id), patch).await
    }

    /// # Errors
    /// Propagates [`ApiClient`] errors.
    pub async fn remove(&self, id: &R::Id) -> ClientResult<()> {
        self.api.delete(&R::item_path(id)).await
    }
}

/// Percent-encodes one path segment (spaces become `%20`, `/` becomes `%2F`).
pub(crate) fn encode_segment(segment: &str) -> String {
    let Ok(mut url) = Url::parse("http://segment.invalid/") else {
        return segment.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}
