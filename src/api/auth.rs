//! Auth endpoints
//!
//! Credential exchange against `/api/auth`. The backend takes credentials as
//! query parameters and returns a JWT; the token is treated as an opaque
//! bearer string except for reading the user id out of its payload segment,
//! which is how the shop front-end discovers who just logged in.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use super::{ApiClient, ApiError, NO_QUERY, users::User};

/// Errors raised during credential exchange.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The issued token is not a decodable JWT; no user id could be read.
    #[error("access token payload could not be decoded")]
    MalformedToken,
}

/// A successful login: the bearer token plus the profile it belongs to.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Opaque bearer token for subsequent requests.
    pub token: String,

    /// Profile of the user the token was issued to.
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    user_id: Uuid,
}

/// Client for the auth endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    /// Creates the auth client.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchanges credentials for a token, installs it on the shared client,
    /// and fetches the matching profile.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Api`] when the backend rejects the credentials or the
    ///   profile fetch fails (the token is uninstalled again in that case).
    /// - [`AuthError::MalformedToken`] when no user id can be read from the
    ///   issued token.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let response: TokenResponse = self
            .client
            .post(
                "/api/auth/login",
                &[
                    ("username", username.to_owned()),
                    ("password", password.to_owned()),
                ],
            )
            .await?;

        let user_id = user_id_from_token(&response.access_token)?;

        self.client.set_token(response.access_token.clone());

        let user: User = match self
            .client
            .get(&format!("/api/users/{user_id}"), NO_QUERY)
            .await
        {
            Ok(user) => user,
            Err(error) => {
                self.client.clear_token();
                return Err(error.into());
            }
        };

        Ok(AuthenticatedUser {
            token: response.access_token,
            user,
        })
    }

    /// Registers a new account and returns its profile. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Api`] when the backend rejects the registration
    /// (e.g. username or email already taken).
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let user = self
            .client
            .post(
                "/api/auth/register",
                &[
                    ("username", username.to_owned()),
                    ("email", email.to_owned()),
                    ("password", password.to_owned()),
                ],
            )
            .await?;

        Ok(user)
    }
}

fn user_id_from_token(token: &str) -> Result<Uuid, AuthError> {
    let payload = token.split('.').nth(1).ok_or(AuthError::MalformedToken)?;

    let decoded = BASE64_URL
        .decode(payload)
        .map_err(|_| AuthError::MalformedToken)?;

    let claims: TokenClaims =
        serde_json::from_slice(&decoded).map_err(|_| AuthError::MalformedToken)?;

    Ok(claims.user_id)
}
