//! User endpoints
//!
//! Profile, address book, stored cards and order history under
//! `/api/users/{user_id}`. The target user id is always an explicit argument
//! and is sent exactly as given. The backend performs no ownership check
//! (its demonstrated BOLA surface), and this client does not add one.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiClient, ApiError, NO_QUERY};

/// A shop account profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Account identifier.
    pub user_id: Uuid,
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Whether the backend considers this account an administrator.
    pub is_admin: bool,
    /// Account creation time.
    pub created_at: Timestamp,
}

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Address {
    /// Address identifier, usable as an order's shipping selection.
    pub address_id: Uuid,
    /// Owning account.
    pub user_id: Uuid,
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
    /// Country.
    pub country: String,
    /// Postal code.
    pub zip_code: String,
    /// Preselected address for checkout.
    pub is_default: bool,
}

/// A stored payment card. Only display-safe fields cross the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreditCard {
    /// Card identifier, usable as an order's payment selection.
    pub card_id: Uuid,
    /// Owning account.
    pub user_id: Uuid,
    /// Name on the card.
    pub cardholder_name: String,
    /// Last four digits, for display.
    pub card_last_four: String,
    /// Expiry month (`MM`).
    pub expiry_month: String,
    /// Expiry year (`YYYY`).
    pub expiry_year: String,
    /// Preselected card for checkout.
    pub is_default: bool,
}

/// One line of a placed order. Pricing is whatever the backend captured at
/// purchase time; the client never supplies it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderItem {
    /// Ordered product.
    pub product_id: Uuid,
    /// Ordered quantity.
    pub quantity: u32,
    /// Unit price the backend recorded at purchase time.
    pub price_at_purchase: Decimal,
}

/// A placed order as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub order_id: Uuid,
    /// Account the order was placed for.
    pub user_id: Uuid,
    /// Shipping address used.
    pub address_id: Uuid,
    /// Payment card used.
    pub credit_card_id: Uuid,
    /// Backend-side order status.
    pub status: String,
    /// Final amount after any discount; backend-authoritative.
    pub total_amount: Decimal,
    /// Discount applied via coupon, zero when none.
    #[serde(default)]
    pub discount_amount: Decimal,
    /// Code of the applied coupon, when one was accepted.
    #[serde(default)]
    pub applied_coupon_code: Option<String>,
    /// Order lines; may be absent on some listings.
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Display digits of the card used.
    #[serde(default)]
    pub credit_card_last_four: Option<String>,
    /// Placement time.
    pub created_at: Timestamp,
}

/// Profile fields to change; `None` fields are left untouched.
///
/// `is_admin` rides along as a plain query parameter exactly like the other
/// fields. That the backend honours it for any caller is the demonstrated
/// parameter-pollution flaw, kept visible here rather than special-cased.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New login name.
    pub username: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New admin flag.
    pub is_admin: Option<bool>,
}

impl ProfileUpdate {
    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.is_admin.is_none()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(username) = &self.username {
            pairs.push(("username", username.clone()));
        }
        if let Some(email) = &self.email {
            pairs.push(("email", email.clone()));
        }
        if let Some(is_admin) = self.is_admin {
            pairs.push(("is_admin", is_admin.to_string()));
        }

        pairs
    }
}

/// Client for the user-scoped endpoints.
#[derive(Debug, Clone)]
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    /// Creates the users client.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetches the profile of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn get_user(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.client.get(&format!("/api/users/{user_id}"), NO_QUERY).await
    }

    /// Lists every account the backend will enumerate for this caller.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.client.get("/api/users", NO_QUERY).await
    }

    /// Applies `update` to the profile of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        self.client
            .put(&format!("/api/users/{user_id}"), &update.query())
            .await
    }

    /// Lists the saved addresses of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn list_addresses(&self, user_id: Uuid) -> Result<Vec<Address>, ApiError> {
        self.client
            .get(&format!("/api/users/{user_id}/addresses"), NO_QUERY)
            .await
    }

    /// Lists the stored cards of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn list_credit_cards(&self, user_id: Uuid) -> Result<Vec<CreditCard>, ApiError> {
        self.client
            .get(&format!("/api/users/{user_id}/credit-cards"), NO_QUERY)
            .await
    }

    /// Lists the order history of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn list_orders(&self, user_id: Uuid) -> Result<Vec<Order>, ApiError> {
        self.client
            .get(&format!("/api/users/{user_id}/orders"), NO_QUERY)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_update_serializes_only_set_fields() {
        let update = ProfileUpdate {
            email: Some("new@example.com".to_owned()),
            ..ProfileUpdate::default()
        };

        assert_eq!(update.query(), vec![("email", "new@example.com".to_owned())]);
    }

    #[test]
    fn profile_update_carries_admin_flag_verbatim() {
        let update = ProfileUpdate {
            is_admin: Some(true),
            ..ProfileUpdate::default()
        };

        assert_eq!(update.query(), vec![("is_admin", "true".to_owned())]);
        assert!(!update.is_empty());
    }

    #[test]
    fn order_listing_parses_backend_shape() {
        let json = r#"{
            "order_id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "user_id": "01890a5d-ac96-774b-bcce-b302099a8058",
            "address_id": "01890a5d-ac96-774b-bcce-b302099a8059",
            "credit_card_id": "01890a5d-ac96-774b-bcce-b302099a805a",
            "status": "pending",
            "total_amount": 54.99,
            "discount_amount": 0.0,
            "applied_coupon_id": null,
            "applied_coupon_code": null,
            "created_at": "2025-06-01T10:15:30.123456+00:00",
            "updated_at": "2025-06-01T10:15:30.123456+00:00",
            "items": [
                {
                    "order_item_id": "01890a5d-ac96-774b-bcce-b302099a805b",
                    "order_id": "01890a5d-ac96-774b-bcce-b302099a8057",
                    "product_id": "01890a5d-ac96-774b-bcce-b302099a805c",
                    "quantity": 1,
                    "price_at_purchase": 49.99
                }
            ],
            "credit_card_last_four": "4242"
        }"#;

        let order: Order = serde_json::from_str(json).expect("order should parse");

        assert_eq!(order.status, "pending");
        assert_eq!(order.total_amount, Decimal::new(5499, 2));
        assert_eq!(order.items.len(), 1);
        assert_eq!(
            order.credit_card_last_four.as_deref(),
            Some("4242"),
            "card digits should survive parsing"
        );
    }
}
