//! Product endpoints
//!
//! Catalog reads under `/api/products` plus the role-gated catalog mutations.
//! The backend decides access from the `role` query parameter; callers here
//! state the roles they want to claim explicitly, including claiming several
//! at once (the parameter-pollution demo), and this client sends them as-is.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiClient, ApiError, NO_QUERY};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub product_id: Uuid,
    /// Display name.
    pub name: String,
    /// Long description, when set.
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price; backend-authoritative.
    pub price: Decimal,
    /// Catalog category, when set.
    #[serde(default)]
    pub category: Option<String>,
    /// Internal status string only meant for staff views.
    #[serde(default)]
    pub internal_status: Option<String>,
    /// Listing time.
    pub created_at: Timestamp,
}

/// Stock level for a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Stock {
    /// Product this stock belongs to.
    pub product_id: Uuid,
    /// Units available.
    pub quantity: u32,
    /// Last stock change.
    pub last_updated: Timestamp,
}

/// Role claimed towards the backend on catalog requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Regular shopper.
    User,
    /// Administrator.
    Admin,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Query shape for catalog listings.
///
/// Each claimed role becomes its own `role=` parameter, so claiming
/// `[User, Admin]` reproduces the polluted `role=user&role=admin` request the
/// demo teaches. `include_internal` adds `status=internal`.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    /// Roles to claim, in order.
    pub roles: Vec<Role>,
    /// Whether to ask for internal-status products.
    pub include_internal: bool,
}

impl CatalogView {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .roles
            .iter()
            .map(|role| ("role", role.as_str().to_owned()))
            .collect();

        if self.include_internal {
            pairs.push(("status", "internal".to_owned()));
        }

        pairs
    }
}

/// Fields for listing a new product or patching an existing one; `None`
/// fields are omitted from the request.
#[derive(Debug, Clone, Default)]
pub struct ProductFields {
    /// Display name.
    pub name: Option<String>,
    /// Unit price.
    pub price: Option<Decimal>,
    /// Long description.
    pub description: Option<String>,
    /// Catalog category.
    pub category: Option<String>,
    /// Internal status string; a staff-only field the backend accepts from
    /// anyone who sends it.
    pub internal_status: Option<String>,
}

impl ProductFields {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(price) = self.price {
            pairs.push(("price", price.to_string()));
        }
        if let Some(description) = &self.description {
            pairs.push(("description", description.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(internal_status) = &self.internal_status {
            pairs.push(("internal_status", internal_status.clone()));
        }

        pairs
    }
}

/// Client for the product endpoints.
#[derive(Debug, Clone)]
pub struct ProductsApi {
    client: ApiClient,
}

impl ProductsApi {
    /// Creates the products client.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists the public catalog.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.client.get("/api/products", NO_QUERY).await
    }

    /// Lists the catalog while claiming the roles in `view`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn list_as(&self, view: &CatalogView) -> Result<Vec<Product>, ApiError> {
        self.client.get("/api/products", &view.query()).await
    }

    /// Searches products by name.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn search(&self, name: &str) -> Result<Vec<Product>, ApiError> {
        self.client
            .get("/api/products/search", &[("name", name.to_owned())])
            .await
    }

    /// Fetches a single product.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn get(&self, product_id: Uuid) -> Result<Product, ApiError> {
        self.client
            .get(&format!("/api/products/{product_id}"), NO_QUERY)
            .await
    }

    /// Fetches the stock level of a product.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn stock(&self, product_id: Uuid) -> Result<Stock, ApiError> {
        self.client
            .get(&format!("/api/products/{product_id}/stock"), NO_QUERY)
            .await
    }

    /// Lists a new product. Gated server-side by role.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn create(&self, fields: &ProductFields) -> Result<Product, ApiError> {
        self.client.post("/api/products", &fields.query()).await
    }

    /// Patches an existing product. Gated server-side by role.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn update(
        &self,
        product_id: Uuid,
        fields: &ProductFields,
    ) -> Result<Product, ApiError> {
        self.client
            .put(&format!("/api/products/{product_id}"), &fields.query())
            .await
    }

    /// Removes a product from the catalog. Gated server-side by role.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn delete(&self, product_id: Uuid) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/api/products/{product_id}"))
            .await
    }

    /// Sets the stock quantity of a product.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on backend rejection or transport failure.
    pub async fn set_stock(&self, product_id: Uuid, quantity: u32) -> Result<Stock, ApiError> {
        self.client
            .put(
                &format!("/api/products/{product_id}/stock"),
                &[("quantity", quantity.to_string())],
            )
            .await
    }
}
