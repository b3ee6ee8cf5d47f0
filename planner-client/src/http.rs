//! # HTTP adapter
//!
//! [`ApiClient`] is the only component that talks to the network. It joins
//! paths onto the configured base URL, attaches the session credential, and
//! turns responses into typed results.
//!
//! A 401 or 403 is handled here and nowhere else: the session is expired and
//! the user is sent to the login page, unless they are already there or the
//! request was itself a credential check.

use std::{sync::Arc, time::Instant};

use http::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use shared::models::ErrorResponse;
use url::Url;

use crate::{
    error::{ClientError, ClientResult},
    guard::{AppRoute, LOGIN_PATH},
    navigation::Navigator,
    session::SessionStore,
    transport::{HttpRequest, HttpResponse, HttpTransport},
};

/// Per-request options for [`ApiClient::send_with`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Sent as-is instead of the session credential.
    pub authorization: Option<String>,
    /// The request is validating credentials; a 401/403 is an answer, not an expiry.
    pub credential_check: bool,
}

impl RequestOptions {
    /// Options for checking a credential that is not stored yet.
    pub fn credential_check(authorization: impl Into<String>) -> Self {
        Self {
            authorization: Some(authorization.into()),
            credential_check: true,
        }
    }
}

/// Builds requests against the backend, attaches the session credential, and
/// maps responses to [`ClientResult`]s. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// An adapter for `base_url`. A trailing slash is ignored.
    pub fn new(
        base_url: &str,
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
            navigator,
        }
    }

    /// Base URL without its trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session whose credential is attached to requests.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Where auth expiry redirects.
    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    fn api_url(&self, path: &str) -> ClientResult<Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined)
            .map_err(|err| ClientError::transport(format!("invalid request URL '{joined}': {err}")))
    }

    /// Sends a request with the session credential attached.
    ///
    /// # Errors
    /// See [`ApiClient::send_with`].
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<HttpResponse> {
        self.send_with(method, path, body, RequestOptions::default())
            .await
    }

    /// Sends a request and classifies the response.
    ///
    /// # Errors
    /// * [`ClientError::Transport`] when no response arrived,
    /// * [`ClientError::Unauthorized`] on 401/403,
    /// * [`ClientError::Server`] on any other non-2xx status.
    pub async fn send_with(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> ClientResult<HttpResponse> {
        let mut request = HttpRequest::new(method.clone(), self.api_url(path)?)
            .header("Accept", "application/json");
        let authorization = options
            .authorization
            .or_else(|| self.session.credential().map(|c| c.header_value()));
        if let Some(value) = authorization {
            request = request.header("Authorization", value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(%method, path, error = %err, "request failed");
                return Err(err);
            }
        };
        let elapsed_ms = started.elapsed().as_millis();
        tracing::debug!(%method, path, status = response.status.as_u16(), elapsed_ms, "request");

        let status = response.status;
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            if !options.credential_check {
                self.handle_unauthorized();
            }
            return Err(ClientError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(ClientError::server(
                status.as_u16(),
                ErrorResponse::message_from_body(&response.body),
            ));
        }
        Ok(response)
    }

    fn handle_unauthorized(&self) {
        if let Err(err) = self.session.expire() {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
        let here = self.navigator.current();
        if AppRoute::from_path(&here) != AppRoute::Login {
            self.navigator.navigate(LOGIN_PATH);
        }
    }

    /// `GET` and decode.
    ///
    /// # Errors
    /// As [`ApiClient::send`], plus [`ClientError::Decode`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(Method::GET, path, None).await?.json()
    }

    /// `POST` a JSON body and decode the reply.
    ///
    /// # Errors
    /// As [`ApiClient::send`], plus [`ClientError::Decode`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(to_body(body)?))
            .await?
            .json()
    }

    /// `PUT` a JSON body and decode the reply.
    ///
    /// # Errors
    /// As [`ApiClient::send`], plus [`ClientError::Decode`].
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(to_body(body)?))
            .await?
            .json()
    }

    /// `DELETE`; any success body is ignored.
    ///
    /// # Errors
    /// As [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send(Method::DELETE, path, None).await.map(|_| ())
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> ClientResult<serde_json::Value> {
    serde_json::to_value(body)
        .map_err(|err| ClientError::decode(format!("failed to encode request body: {err}")))
}
