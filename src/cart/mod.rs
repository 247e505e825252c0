//! Cart
//!
//! The ordered collection of line items a shopper has picked, plus the pure
//! operations over it. Durable persistence lives in [`store`]; the only legal
//! mutation path for application code is [`service::CartService`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod service;
pub mod store;
pub mod summary;

/// One product/quantity pairing within the cart.
///
/// Name and unit price are snapshots taken when the product was added; they
/// are never re-fetched. The serialized field names match the shape the shop
/// front-end has always persisted (`price`, not `unit_price`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog identifier of the product.
    pub product_id: Uuid,

    /// Display name at the time of add.
    pub name: String,

    /// Unit price at the time of add. Authoritative pricing stays
    /// server-side; this copy exists only for local summary display.
    #[serde(rename = "price")]
    pub unit_price: Decimal,

    /// Always at least 1; a quantity driven to 0 removes the line.
    pub quantity: u32,
}

impl LineItem {
    /// Line total, exact (no rounding).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Ordered cart contents. Insertion order is display order.
///
/// At most one line exists per product; adding a product that is already
/// present merges into the existing line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item` to the cart, merging quantities when a line for the same
    /// product already exists.
    pub fn add(&mut self, item: LineItem) {
        match self
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
    }

    /// Sets the quantity of the line for `product_id`.
    ///
    /// A quantity of 0 removes the line. Setting a quantity for an absent
    /// product is a no-op, matching the permissive front-end behaviour.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = quantity;
        }
    }

    /// Removes the line for `product_id`; a no-op when absent.
    pub fn remove(&mut self, product_id: Uuid) {
        self.items.retain(|line| line.product_id != product_id);
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: Uuid) -> Option<&LineItem> {
        self.items.iter().find(|line| line.product_id == product_id)
    }

    /// Total quantity across all lines; the value shown as the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the lines in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: Uuid, name: &str, unit_price: Decimal, quantity: u32) -> LineItem {
        LineItem {
            product_id,
            name: name.to_owned(),
            unit_price,
            quantity,
        }
    }

    #[test]
    fn add_merges_existing_product_into_one_line() {
        let product = Uuid::now_v7();
        let mut cart = Cart::new();

        cart.add(item(product, "Wireless Mouse", Decimal::new(1999, 2), 2));
        cart.add(item(product, "Wireless Mouse", Decimal::new(1999, 2), 3));

        assert_eq!(cart.len(), 1);
        let line = cart.line(product).expect("line should exist");
        assert_eq!(line.quantity, 5);
    }

    #[test]
    fn add_keeps_insertion_order() {
        let first = Uuid::now_v7();
        let second = Uuid::now_v7();
        let mut cart = Cart::new();

        cart.add(item(first, "Keyboard", Decimal::new(4999, 2), 1));
        cart.add(item(second, "Headset", Decimal::new(2999, 2), 1));

        let order: Vec<Uuid> = cart.iter().map(|line| line.product_id).collect();
        assert_eq!(order, vec![first, second]);
    }

    #[test]
    fn set_quantity_zero_removes_the_line() {
        let product = Uuid::now_v7();
        let mut cart = Cart::new();
        cart.add(item(product, "Webcam", Decimal::new(5999, 2), 2));

        cart.set_quantity(product, 0);

        assert!(cart.line(product).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_for_absent_product_is_a_no_op() {
        let mut cart = Cart::new();
        cart.add(item(Uuid::now_v7(), "Speaker", Decimal::new(3499, 2), 1));
        let before = cart.clone();

        cart.set_quantity(Uuid::now_v7(), 4);

        assert_eq!(cart, before);
    }

    #[test]
    fn remove_absent_product_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add(item(Uuid::now_v7(), "Monitor", Decimal::new(29999, 2), 1));
        let before = cart.clone();

        cart.remove(Uuid::now_v7());

        assert_eq!(cart, before);
    }

    #[test]
    fn item_count_sums_quantities() {
        let mut cart = Cart::new();
        cart.add(item(Uuid::now_v7(), "Laptop", Decimal::new(99999, 2), 1));
        cart.add(item(Uuid::now_v7(), "Mouse", Decimal::new(1999, 2), 3));

        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn line_total_is_exact() {
        let line = item(Uuid::now_v7(), "SSD", Decimal::new(1999, 2), 3);

        assert_eq!(line.line_total(), Decimal::new(5997, 2));
    }

    #[test]
    fn serialized_shape_matches_persisted_format() {
        let product = Uuid::now_v7();
        let mut cart = Cart::new();
        cart.add(item(product, "Desk Lamp", Decimal::new(2450, 2), 2));

        let json = serde_json::to_value(&cart).expect("cart should serialize");
        let lines = json.as_array().expect("cart serializes as an array");
        let line = lines.first().expect("one line");

        assert_eq!(line["product_id"], serde_json::json!(product));
        assert_eq!(line["name"], "Desk Lamp");
        assert_eq!(line["price"], "24.50");
        assert_eq!(line["quantity"], 2);
    }

    #[test]
    fn deserializes_legacy_numeric_prices() {
        let json = r#"[{"product_id":"01890a5d-ac96-774b-bcce-b302099a8057","name":"Gaming Headset","price":49.99,"quantity":1}]"#;

        let cart: Cart = serde_json::from_str(json).expect("legacy payload should parse");

        assert_eq!(cart.item_count(), 1);
        let line = cart.iter().next().expect("one line");
        assert_eq!(line.unit_price, Decimal::new(4999, 2));
    }
}
