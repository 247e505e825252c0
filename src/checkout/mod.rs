//! Checkout
//!
//! Turns the current cart into exactly one order-creation request and clears
//! the cart when the backend accepts it. Prices never ride along; the backend
//! reprices every line from its own catalog, so the request carries only
//! product ids and quantities.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{ApiError, orders::OrdersApi};
use crate::cart::service::CartService;

/// One line of an order request: which product, how many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    /// Product to order.
    pub product_id: Uuid,
    /// Units to order.
    pub quantity: u32,
}

/// A fully resolved order-creation request.
///
/// The backend takes order parameters as positionally indexed query pairs
/// (`product_id_1`, `quantity_1`, `product_id_2`, ...) rather than a
/// structured body; [`Self::query_pairs`] produces that exact wire shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// User the order is placed for. Sent verbatim in the request path; the
    /// backend does not check it against the bearer token.
    pub on_behalf_of: Uuid,
    /// Shipping address to use.
    pub shipping_address_id: Uuid,
    /// Stored card to charge.
    pub payment_method_id: Uuid,
    /// Snapshot of the cart lines at submission time.
    pub line_items: Vec<OrderLine>,
}

impl OrderRequest {
    /// Encodes the request as the backend's positional query parameters.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("address_id".to_owned(), self.shipping_address_id.to_string()),
            (
                "credit_card_id".to_owned(),
                self.payment_method_id.to_string(),
            ),
        ];

        for (position, line) in self.line_items.iter().enumerate() {
            let index = position + 1;
            pairs.push((format!("product_id_{index}"), line.product_id.to_string()));
            pairs.push((format!("quantity_{index}"), line.quantity.to_string()));
        }

        pairs
    }
}

/// Caller-supplied selections for a checkout attempt.
#[derive(Debug, Clone)]
pub struct OrderPlacement {
    /// User to place the order for.
    pub on_behalf_of: Uuid,
    /// Selected shipping address, when one was chosen.
    pub shipping_address: Option<Uuid>,
    /// Selected payment card, when one was chosen.
    pub payment_method: Option<Uuid>,
    /// Coupon code staged before submission, applied after the order is
    /// created.
    pub coupon_code: Option<String>,
}

/// Errors raised while placing an order.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The cart holds no lines; there is nothing to order.
    #[error("cannot place an order with an empty cart")]
    EmptyCart,

    /// No shipping address was selected.
    #[error("no shipping address selected")]
    MissingShippingAddress,

    /// No payment card was selected.
    #[error("no payment method selected")]
    MissingPaymentMethod,

    /// A submission is already in flight; the builder is busy until it
    /// resolves.
    #[error("an order submission is already in flight")]
    SubmissionInFlight,

    /// The order was created but the staged coupon was rejected.
    #[error("coupon was rejected for order {order_id}")]
    CouponRejected {
        /// Identifier of the order that was still placed.
        order_id: Uuid,
        /// The backend's rejection.
        #[source]
        source: ApiError,
    },

    /// The backend rejected the order or the request did not complete.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Where a checkout attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    /// No submission underway.
    #[default]
    Idle,
    /// Preconditions are being validated; nothing sent yet.
    Building,
    /// The order request is in flight.
    Submitting,
    /// The order was accepted; holds its identifier.
    Succeeded(Uuid),
    /// The submission failed; the cart is preserved and a retry is allowed.
    ///
    /// Reported until the next [`CheckoutService::place_order`] call, which
    /// starts a fresh cycle from `Building`; the flow never parks in a
    /// separate `Idle` between a failure and the retry.
    Failed,
}

/// Drives a cart through order submission.
///
/// Not `Clone`: the in-flight guard lives in `state` and must not be
/// duplicated.
pub struct CheckoutService {
    orders: Arc<dyn OrdersApi>,
    state: CheckoutState,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CheckoutService {
    /// Creates a checkout service over the given orders backend.
    #[must_use]
    pub fn new(orders: Arc<dyn OrdersApi>) -> Self {
        Self {
            orders,
            state: CheckoutState::Idle,
        }
    }

    /// Where the last submission stands.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        self.state
    }

    /// Places the current cart as one order and returns the new order's
    /// identifier.
    ///
    /// On success the cart is cleared; a clear that cannot be persisted is
    /// logged but does not fail the placement, since the order exists either
    /// way. On any failure the cart is left untouched and a retry is allowed.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SubmissionInFlight`] when a previous call has not
    ///   resolved yet.
    /// - [`CheckoutError::EmptyCart`], [`CheckoutError::MissingShippingAddress`]
    ///   or [`CheckoutError::MissingPaymentMethod`] when preconditions fail;
    ///   nothing is sent.
    /// - [`CheckoutError::CouponRejected`] when the order was created but the
    ///   staged coupon was refused; the order id is carried in the error.
    /// - [`CheckoutError::Api`] when the backend rejects the order or the
    ///   request does not complete.
    pub async fn place_order(
        &mut self,
        cart: &mut CartService,
        placement: &OrderPlacement,
    ) -> Result<Uuid, CheckoutError> {
        if self.state == CheckoutState::Submitting {
            return Err(CheckoutError::SubmissionInFlight);
        }

        self.state = CheckoutState::Building;

        let request = match self.build_request(cart, placement) {
            Ok(request) => request,
            Err(error) => {
                self.state = CheckoutState::Idle;
                return Err(error);
            }
        };

        self.state = CheckoutState::Submitting;

        let order = match self.orders.create(&request).await {
            Ok(order) => order,
            Err(error) => {
                self.state = CheckoutState::Failed;
                return Err(error.into());
            }
        };

        if let Some(coupon_code) = &placement.coupon_code {
            if let Err(error) = self
                .orders
                .apply_coupon(placement.on_behalf_of, order.order_id, coupon_code)
                .await
            {
                self.state = CheckoutState::Failed;
                return Err(CheckoutError::CouponRejected {
                    order_id: order.order_id,
                    source: error,
                });
            }
        }

        if let Err(error) = cart.clear() {
            warn!(order_id = %order.order_id, %error, "order placed but cart could not be cleared");
        }

        info!(order_id = %order.order_id, "checkout succeeded");
        self.state = CheckoutState::Succeeded(order.order_id);

        Ok(order.order_id)
    }

    fn build_request(
        &self,
        cart: &CartService,
        placement: &OrderPlacement,
    ) -> Result<OrderRequest, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let shipping_address_id = placement
            .shipping_address
            .ok_or(CheckoutError::MissingShippingAddress)?;
        let payment_method_id = placement
            .payment_method
            .ok_or(CheckoutError::MissingPaymentMethod)?;

        let line_items = cart
            .cart()
            .iter()
            .map(|line| OrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect();

        Ok(OrderRequest {
            on_behalf_of: placement.on_behalf_of,
            shipping_address_id,
            payment_method_id,
            line_items,
        })
    }
}
