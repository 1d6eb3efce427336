//! User and profile API client methods

use super::{ClientError, OmnideskClient};
use crate::types::{ProfileEnvelope, ProfileUpdate, User, UsersResponse};
use reqwest::Method;

impl OmnideskClient {
    /// All users, as offered in the assignee picker
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] if not logged in
    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        let req = self.request(Method::GET, "/users");
        let response: UsersResponse = self.execute(req).await?;
        Ok(response.users)
    }

    /// Profile of the current user
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] if not logged in
    pub async fn profile(&self) -> Result<User, ClientError> {
        let req = self.request(Method::GET, "/users/profile");
        self.execute(req).await
    }

    /// Update username, email or about text of the current user
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BadRequest`] if the username or email is taken
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<ProfileEnvelope, ClientError> {
        let req = self.request(Method::PUT, "/users/profile").json(update);
        self.execute(req).await
    }

    /// Look up another user's public profile
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if no such user exists and
    /// [`ClientError::BadRequest`] for names that would be read as a path
    /// segment such as `..`
    pub async fn user_by_username(&self, username: &str) -> Result<User, ClientError> {
        if matches!(username, "" | "." | "..") {
            return Err(ClientError::BadRequest(format!(
                "Invalid username '{username}'"
            )));
        }
        let mut url = reqwest::Url::parse(&format!("{}/users/", self.base_url()))
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Configuration("base_url cannot be a base".into()))?
            .pop_if_empty()
            .push(username);
        let req = self.client.get(url);
        self.execute(req).await
    }
}
