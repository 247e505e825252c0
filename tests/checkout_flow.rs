//! End-to-end cart and checkout flow over the public API of the crate.

use std::sync::Arc;

use rust_decimal::Decimal;
use testresult::TestResult;
use uuid::Uuid;

use storefront::api::orders::MockOrdersApi;
use storefront::api::users::Order;
use storefront::cart::service::CartService;
use storefront::cart::store::{CartStore, JsonFileCartStore};
use storefront::checkout::{CheckoutService, CheckoutState, OrderPlacement};

fn accepted_order(order_id: Uuid, user_id: Uuid) -> Order {
    Order {
        order_id,
        user_id,
        address_id: Uuid::now_v7(),
        credit_card_id: Uuid::now_v7(),
        status: "pending".to_owned(),
        total_amount: Decimal::new(5997, 2),
        discount_amount: Decimal::ZERO,
        applied_coupon_code: None,
        items: Vec::new(),
        credit_card_last_four: Some("4242".to_owned()),
        created_at: jiff::Timestamp::UNIX_EPOCH,
    }
}

#[test]
fn summary_tracks_a_full_shopping_session() -> TestResult {
    let mut cart = CartService::new(Arc::new(
        storefront::cart::store::MemoryCartStore::new(),
    ));
    let product = Uuid::now_v7();

    // Empty cart: everything zero.
    let summary = cart.summary();
    assert_eq!(summary.subtotal, Decimal::ZERO);
    assert_eq!(summary.shipping, Decimal::ZERO);
    assert_eq!(summary.total, Decimal::ZERO);

    // One unit under the free-shipping threshold pays shipping.
    cart.add_item(product, "Wireless Mouse", Decimal::new(1999, 2), 1)?;
    let summary = cart.summary();
    assert_eq!(summary.subtotal, Decimal::new(1999, 2));
    assert_eq!(summary.shipping, Decimal::new(500, 2));
    assert_eq!(summary.total, Decimal::new(2499, 2));

    // Three units cross the threshold and ship free.
    cart.set_quantity(product, 3)?;
    let summary = cart.summary();
    assert_eq!(summary.subtotal, Decimal::new(5997, 2));
    assert_eq!(summary.shipping, Decimal::ZERO);
    assert_eq!(summary.total, Decimal::new(5997, 2));

    // Removing the line returns everything to zero.
    cart.remove_item(product)?;
    let summary = cart.summary();
    assert_eq!(summary.subtotal, Decimal::ZERO);
    assert_eq!(summary.shipping, Decimal::ZERO);
    assert_eq!(summary.total, Decimal::ZERO);

    Ok(())
}

#[tokio::test]
async fn checkout_drains_a_file_backed_cart_on_success() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(JsonFileCartStore::new(dir.path().join("cart.json")));

    let mut cart = CartService::new(Arc::clone(&store) as Arc<dyn CartStore>);
    let first = Uuid::now_v7();
    let second = Uuid::now_v7();
    cart.add_item(first, "Wireless Mouse", Decimal::new(1999, 2), 2)?;
    cart.add_item(second, "USB-C Hub", Decimal::new(3999, 2), 1)?;

    let user_id = Uuid::now_v7();
    let order_id = Uuid::now_v7();

    let mut orders = MockOrdersApi::new();
    orders
        .expect_create()
        .withf(move |request| {
            let pairs = request.query_pairs();
            pairs.iter().any(|(key, value)| {
                key == "product_id_1" && *value == first.to_string()
            }) && pairs.iter().any(|(key, value)| {
                key == "quantity_2" && value == "1"
            })
        })
        .times(1)
        .returning(move |_| Ok(accepted_order(order_id, user_id)));

    let mut checkout = CheckoutService::new(Arc::new(orders));
    let placement = OrderPlacement {
        on_behalf_of: user_id,
        shipping_address: Some(Uuid::now_v7()),
        payment_method: Some(Uuid::now_v7()),
        coupon_code: None,
    };

    let placed = checkout.place_order(&mut cart, &placement).await?;

    assert_eq!(placed, order_id);
    assert_eq!(checkout.state(), CheckoutState::Succeeded(order_id));
    assert!(cart.is_empty());

    // The drained cart is what a reload would see.
    assert!(store.load().is_empty());

    Ok(())
}
