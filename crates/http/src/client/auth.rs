//! Authentication API client methods

use super::session::Tokens;
use super::{ClientError, OmnideskClient};
use crate::types::{
    LoginRequest, LoginResponse, MessageResponse, PasswordReset, PasswordResetRequest,
    RefreshResponse, RegisterRequest, User,
};
use reqwest::Method;

impl OmnideskClient {
    /// Log in and store the issued token pair
    ///
    /// Credentials are sent without the refresh interceptor, so a 401 here
    /// means the username or password was wrong.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthenticationFailed`] for bad credentials
    pub async fn login(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<LoginResponse, ClientError> {
        let req = self.request(Method::POST, "/auth/login").json(&LoginRequest {
            username: username.into(),
            password: password.into(),
        });
        let response: LoginResponse = self.execute_public(req).await?;
        self.remember(&response)?;
        info!(username = %response.user.username, "Logged in");
        Ok(response)
    }

    /// Create an account and store the issued token pair
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BadRequest`] if the username or email is taken
    pub async fn register(&self, request: RegisterRequest) -> Result<LoginResponse, ClientError> {
        let req = self.request(Method::POST, "/auth/register").json(&request);
        let response: LoginResponse = self.execute_public(req).await?;
        self.remember(&response)?;
        info!(username = %response.user.username, "Registered new account");
        Ok(response)
    }

    /// Exchange the stored refresh token for a new access token
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] if no refresh token is stored
    pub async fn refresh(&self) -> Result<RefreshResponse, ClientError> {
        let refresh_token = self
            .tokens()
            .refresh_token()
            .ok_or(ClientError::SessionExpired)?;
        let access_token = self.exchange_refresh_token(&refresh_token).await?;
        self.tokens().set_access_token(&access_token)?;
        Ok(RefreshResponse { access_token })
    }

    /// End the session
    ///
    /// The backend is told first, on a best effort basis. Local tokens are
    /// always cleared.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local session cannot be removed
    pub async fn logout(&self) -> Result<(), ClientError> {
        if self.is_authenticated() {
            let req = self.request(Method::POST, "/auth/logout");
            if let Err(e) = self.execute::<MessageResponse>(req).await {
                debug!(error = %e, "Logout request failed, clearing local session anyway");
            }
        }
        self.tokens().clear()
    }

    /// The logged in user
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] if not logged in
    pub async fn current_user(&self) -> Result<User, ClientError> {
        let req = self.request(Method::GET, "/auth/me");
        self.execute(req).await
    }

    /// Ask for password reset instructions to be emailed
    ///
    /// The backend answers the same way whether or not the address is known.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BadRequest`] if the email is empty
    pub async fn request_password_reset(
        &self,
        email: impl Into<String>,
    ) -> Result<MessageResponse, ClientError> {
        let req = self
            .request(Method::POST, "/auth/reset-password-request")
            .json(&PasswordResetRequest {
                email: email.into(),
            });
        self.execute_public(req).await
    }

    /// Set a new password using an emailed reset token
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::BadRequest`] if the token is invalid or expired
    pub async fn reset_password(&self, reset: PasswordReset) -> Result<MessageResponse, ClientError> {
        let req = self
            .request(Method::POST, "/auth/reset-password")
            .json(&reset);
        self.execute_public(req).await
    }

    fn remember(&self, response: &LoginResponse) -> Result<(), ClientError> {
        self.tokens().store(Tokens::new(
            response.access_token.clone(),
            response.refresh_token.clone(),
        ))
    }
}
