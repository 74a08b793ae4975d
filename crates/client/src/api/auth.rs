//! Authentication and account endpoints.

use tracing::instrument;
use tunda_core::PhoneNumber;

use super::types::{NewUser, ProfileUpdate, TokenPair, UserProfile};
use super::{ApiError, ApiGateway, ApiRequest};

/// Typed wrapper for the `users` endpoints.
///
/// The token refresh endpoint is deliberately absent: refresh is the
/// gateway's own concern, driven by 401 responses.
#[derive(Clone)]
pub struct AuthApi {
    gateway: ApiGateway,
}

impl AuthApi {
    /// Create the wrapper over a gateway.
    #[must_use]
    pub const fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    /// Exchange credentials for an access/refresh token pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password))]
    pub async fn create_session(
        &self,
        phone_number: &PhoneNumber,
        password: &str,
    ) -> Result<TokenPair, ApiError> {
        let request = ApiRequest::post("/users/jwt/create/").json(serde_json::json!({
            "phone_number": phone_number,
            "password": password,
        }));
        self.gateway.execute(request).await
    }

    /// Fetch the authenticated account's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or the request fails.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.gateway
            .execute(ApiRequest::get("/users/users/me/"))
            .await
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    #[instrument(skip(self, new_user), fields(phone_number = %new_user.phone_number))]
    pub async fn register(&self, new_user: &NewUser) -> Result<UserProfile, ApiError> {
        let body = serde_json::to_value(new_user)?;
        self.gateway
            .execute(ApiRequest::post("/users/register/").json(body))
            .await
    }

    /// Apply a partial profile update and return the updated profile.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let body = serde_json::to_value(update)?;
        self.gateway
            .execute(ApiRequest::patch("/users/profile/").json(body))
            .await
    }

    /// Change the account password.
    ///
    /// # Errors
    ///
    /// Returns an error if the current password is rejected or the request
    /// fails.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let request = ApiRequest::post("/users/change-password/").json(serde_json::json!({
            "old_password": current_password,
            "new_password": new_password,
        }));
        let _: serde_json::Value = self.gateway.execute(request).await?;
        Ok(())
    }
}
