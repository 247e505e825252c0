//! Shop API client
//!
//! Thin typed wrapper around the external shop backend. The backend is an
//! HTTP collaborator only; nothing here models its authorization logic, and
//! every user-scoped path takes the target user id it was given verbatim.

use std::sync::{Arc, RwLock};

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

pub mod auth;
pub mod orders;
pub mod products;
pub mod users;

/// Default backend address when `STOREFRONT_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Typed empty query for endpoints that take no parameters.
pub(crate) const NO_QUERY: &[(&str, &str)] = &[];

/// Connection settings for the shop backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend address, e.g. `"http://localhost:8000"`.
    pub base_url: String,
}

impl ApiConfig {
    /// Builds the configuration from the environment (`.env` honoured),
    /// falling back to [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn from_env() -> Self {
        let _env = dotenvy::dotenv();

        Self {
            base_url: std::env::var("STOREFRONT_API_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
        }
    }
}

/// Errors raised by shop API calls.
///
/// 401 and 403 are distinct variants on purpose: for the demo flows they are
/// often the interesting outcome and callers assert on them.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not complete at the transport level.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend rejected the credentials or token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The backend refused the operation for this caller (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The addressed resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success response.
    #[error("request failed with status {status}: {detail}")]
    UnexpectedResponse {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Error detail from the response body when available.
        detail: String,
    },
}

/// HTTP client for the shop backend, sharing one bearer token across clones.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Creates a client from the given configuration, with no token set.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Installs the bearer token attached to subsequent requests. All clones
    /// of this client observe the change.
    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.into());
        }
    }

    /// Drops the bearer token; subsequent requests go out unauthenticated.
    pub fn clear_token(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }

    /// Whether a bearer token is currently installed.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.read().map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Backend address this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.config.base_url);
        let builder = self.http.request(method, url);

        match self.token.read().ok().and_then(|guard| guard.clone()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned, Q: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        debug!(%method, path, "shop api request");

        let response = self.request(method, path).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        Ok(response.json().await?)
    }

    pub(crate) async fn get<T: DeserializeOwned, Q: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        self.send(Method::GET, path, query).await
    }

    pub(crate) async fn post<T: DeserializeOwned, Q: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, query).await
    }

    pub(crate) async fn put<T: DeserializeOwned, Q: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        self.send(Method::PUT, path, query).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, path).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

async fn error_from_response(status: StatusCode, response: reqwest::Response) -> ApiError {
    let detail = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.detail)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_owned()
        });

    classify(status, detail)
}

fn classify(status: StatusCode, detail: String) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(detail),
        StatusCode::FORBIDDEN => ApiError::Forbidden(detail),
        StatusCode::NOT_FOUND => ApiError::NotFound(detail),
        other => ApiError::UnexpectedResponse {
            status: other.as_u16(),
            detail,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_map_to_distinct_variants() {
        let unauthorized = classify(StatusCode::UNAUTHORIZED, "bad token".to_owned());
        let forbidden = classify(StatusCode::FORBIDDEN, "admin only".to_owned());
        let not_found = classify(StatusCode::NOT_FOUND, "no such user".to_owned());

        assert!(matches!(unauthorized, ApiError::Unauthorized(_)), "got {unauthorized:?}");
        assert!(matches!(forbidden, ApiError::Forbidden(_)), "got {forbidden:?}");
        assert!(matches!(not_found, ApiError::NotFound(_)), "got {not_found:?}");
    }

    #[test]
    fn other_statuses_keep_code_and_detail() {
        let error = classify(StatusCode::BAD_REQUEST, "address_id required".to_owned());

        match error {
            ApiError::UnexpectedResponse { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "address_id required");
            }
            other => panic!("expected UnexpectedResponse, got {other:?}"),
        }
    }

    #[test]
    fn token_is_shared_across_clones() {
        let client = ApiClient::new(ApiConfig {
            base_url: DEFAULT_BASE_URL.to_owned(),
        });
        let clone = client.clone();

        client.set_token("abc");
        assert!(clone.has_token());

        clone.clear_token();
        assert!(!client.has_token());
    }
}
