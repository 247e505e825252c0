//! Session context
//!
//! One owner for everything that is per-visitor state: the shared API client
//! and its bearer token, the persisted cart, the checkout flow, and the
//! profile of whoever is logged in. Constructed once at startup and passed to
//! the components that need it; cleared in one place on logout or expiry.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{
    ApiClient, ApiConfig, ApiError,
    auth::{AuthApi, AuthError},
    orders::HttpOrdersApi,
    products::ProductsApi,
    users::{User, UsersApi},
};
use crate::cart::{service::CartService, store::CartStore};
use crate::checkout::{CheckoutError, CheckoutService, OrderPlacement};

/// Per-visitor state for one storefront session.
pub struct Session {
    client: ApiClient,
    auth: AuthApi,
    users: UsersApi,
    products: ProductsApi,
    cart: CartService,
    checkout: CheckoutService,
    current_user: Option<User>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current_user", &self.current_user)
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wires a session from the backend configuration and a cart store.
    #[must_use]
    pub fn new(config: ApiConfig, store: Arc<dyn CartStore>) -> Self {
        let client = ApiClient::new(config);

        Self {
            auth: AuthApi::new(client.clone()),
            users: UsersApi::new(client.clone()),
            products: ProductsApi::new(client.clone()),
            checkout: CheckoutService::new(Arc::new(HttpOrdersApi::new(client.clone()))),
            cart: CartService::new(store),
            current_user: None,
            client,
        }
    }

    /// Logs in, installing the bearer token on the shared client and caching
    /// the profile it belongs to.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the credentials are rejected, the token
    /// is unreadable, or the profile fetch fails.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<&User, AuthError> {
        let authenticated = self.auth.login(username, password).await?;

        info!(user_id = %authenticated.user.user_id, username, "logged in");

        // login() already installed the token on the shared client.
        Ok(self.current_user.insert(authenticated.user))
    }

    /// Logs out: drops the token, the cached profile and the cart.
    ///
    /// A cart store that cannot persist the now-empty cart is logged and
    /// otherwise ignored; the session is gone either way.
    pub fn logout(&mut self) {
        self.client.clear_token();
        self.current_user = None;

        if let Err(error) = self.cart.clear() {
            warn!(%error, "cart could not be cleared on logout");
        }

        info!("logged out");
    }

    /// Treats a 401 from any call as an expired session: performs the same
    /// cleanup as [`Self::logout`]. Returns whether the error was a 401.
    pub fn expire_if_unauthorized(&mut self, error: &ApiError) -> bool {
        if matches!(error, ApiError::Unauthorized(_)) {
            warn!("session expired, clearing local state");
            self.logout();
            return true;
        }

        false
    }

    /// Places the current cart as an order via the checkout flow.
    ///
    /// # Errors
    ///
    /// Propagates [`CheckoutError`] from the checkout flow.
    pub async fn place_order(
        &mut self,
        placement: &OrderPlacement,
    ) -> Result<Uuid, CheckoutError> {
        self.checkout.place_order(&mut self.cart, placement).await
    }

    /// Profile of the logged-in user, when any.
    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Whether a user is logged in.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    /// The session's cart.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.cart
    }

    /// The session's cart, for mutation.
    pub fn cart_mut(&mut self) -> &mut CartService {
        &mut self.cart
    }

    /// The session's checkout flow.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.checkout
    }

    /// Client for the user endpoints, sharing this session's token.
    #[must_use]
    pub fn users(&self) -> &UsersApi {
        &self.users
    }

    /// Client for the product endpoints, sharing this session's token.
    #[must_use]
    pub fn products(&self) -> &ProductsApi {
        &self.products
    }

    /// Client for the auth endpoints.
    #[must_use]
    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }
}
