use http::Method;
use shared::models::{Credential, LoginRequest, LoginResponse, RegisterRequest};

use crate::{
    error::{ClientError, ClientResult},
    http::{ApiClient, RequestOptions},
};

/// `/auth` endpoints. Every call is a credential check: a 401 means "wrong
/// credentials", not "session expired".
#[derive(Debug, Clone)]
pub struct AuthApi {
    api: ApiClient,
}

impl AuthApi {
    /// A client over `api`.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /auth/check` with an explicit credential.
    ///
    /// # Errors
    /// [`ClientError::Unauthorized`] for bad credentials, otherwise as [`ApiClient::send_with`].
    pub async fn check(&self, credential: &Credential) -> ClientResult<LoginResponse> {
        self.api
            .send_with(
                Method::GET,
                "auth/check",
                None,
                RequestOptions::credential_check(credential.header_value()),
            )
            .await?
            .json()
    }

    /// `POST /auth/login`, for backends that issue bearer tokens.
    ///
    /// # Errors
    /// [`ClientError::Unauthorized`] for bad credentials, otherwise as [`ApiClient::send_with`].
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        let body = serde_json::to_value(request)
            .map_err(|err| ClientError::decode(err.to_string()))?;
        let options = RequestOptions {
            credential_check: true,
            ..RequestOptions::default()
        };
        self.api
            .send_with(Method::POST, "auth/login", Some(body), options)
            .await?
            .json()
    }

    /// `POST /auth/register`. The response body is not needed.
    ///
    /// # Errors
    /// As [`ApiClient::send_with`].
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        let body = serde_json::to_value(request)
            .map_err(|err| ClientError::decode(err.to_string()))?;
        let options = RequestOptions {
            credential_check: true,
            ..RequestOptions::default()
        };
        self.api
            .send_with(Method::POST, "auth/register", Some(body), options)
            .await
            .map(|_| ())
    }
}
