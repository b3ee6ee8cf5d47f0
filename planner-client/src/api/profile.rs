use shared::{
    form::ValidationErrors,
    models::{ProfileUpdate, UserProfile},
};

use crate::{
    error::{ClientError, ClientResult},
    http::ApiClient,
};

const PROFILE_PATH: &str = "users/profile";

/// The signed-in user's profile.
#[derive(Debug, Clone)]
pub struct ProfileApi {
    api: ApiClient,
}

impl ProfileApi {
    /// A client over `api`.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// As [`ApiClient::get_json`].
    pub async fn get(&self) -> ClientResult<UserProfile> {
        self.api.get_json(PROFILE_PATH).await
    }

    /// # Errors
    /// [`ClientError::Validation`] for an empty update, otherwise as [`ApiClient::put_json`].
    pub async fn update(&self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        if update.is_empty() {
            return Err(ClientError::Validation(ValidationErrors::single(
                "profile",
                "nothing to update",
            )));
        }
        self.api.put_json(PROFILE_PATH, update).await
    }
}
