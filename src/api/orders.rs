//! Order endpoints
//!
//! Order placement and coupon application under
//! `/api/users/{user_id}/orders`. The user id in the path is whatever the
//! caller built into the request; the backend trusts it without checking it
//! against the bearer token (its demonstrated BFLA surface).

use async_trait::async_trait;
use mockall::automock;
use tracing::info;
use uuid::Uuid;

use super::{ApiClient, ApiError, users::Order};
use crate::checkout::OrderRequest;

/// Backend operations needed to place an order.
///
/// Checkout depends on this trait rather than on [`HttpOrdersApi`] directly
/// so its state machine can be tested without a running backend.
#[automock]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Submits an order and returns the backend's record of it.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    async fn create(&self, request: &OrderRequest) -> Result<Order, ApiError>;

    /// Applies a coupon code to an already placed order.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the code is rejected or on transport
    /// failure.
    async fn apply_coupon(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        coupon_code: &str,
    ) -> Result<Order, ApiError>;
}

/// [`OrdersApi`] over the real shop backend.
#[derive(Debug, Clone)]
pub struct HttpOrdersApi {
    client: ApiClient,
}

impl HttpOrdersApi {
    /// Creates the orders client.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrdersApi for HttpOrdersApi {
    async fn create(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        let order: Order = self
            .client
            .post(
                &format!("/api/users/{}/orders", request.on_behalf_of),
                &request.query_pairs(),
            )
            .await?;

        info!(order_id = %order.order_id, user_id = %order.user_id, "order created");

        Ok(order)
    }

    async fn apply_coupon(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        coupon_code: &str,
    ) -> Result<Order, ApiError> {
        self.client
            .post(
                &format!("/api/users/{user_id}/orders/{order_id}/apply-coupon"),
                &[("coupon_code", coupon_code.to_owned())],
            )
            .await
    }
}
