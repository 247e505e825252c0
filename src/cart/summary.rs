//! Cart summary
//!
//! Pure derivation of subtotal, shipping and total from cart contents.
//! Amounts accumulate in [`Decimal`] and are rounded to two decimal places
//! only at the display boundary; the free-shipping comparison always uses the
//! unrounded subtotal.

use rust_decimal::{Decimal, RoundingStrategy};

use super::Cart;

/// Subtotal at or above which shipping is free (inclusive).
#[must_use]
pub fn free_shipping_threshold() -> Decimal {
    Decimal::new(5000, 2)
}

/// Flat shipping cost charged below the free-shipping threshold.
#[must_use]
pub fn standard_shipping_cost() -> Decimal {
    Decimal::new(500, 2)
}

/// Derived totals for a cart. Never stored; recompute on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    /// Exact sum of `unit_price * quantity` across all lines.
    pub subtotal: Decimal,

    /// Zero at or above the free-shipping threshold, otherwise the flat rate.
    pub shipping: Decimal,

    /// `subtotal + shipping`.
    pub total: Decimal,
}

impl CartSummary {
    /// Summarizes `cart`. An empty cart yields an all-zero summary with no
    /// shipping charge.
    #[must_use]
    pub fn of(cart: &Cart) -> Self {
        if cart.is_empty() {
            return Self {
                subtotal: Decimal::ZERO,
                shipping: Decimal::ZERO,
                total: Decimal::ZERO,
            };
        }

        let subtotal: Decimal = cart.iter().map(super::LineItem::line_total).sum();

        let shipping = if subtotal >= free_shipping_threshold() {
            Decimal::ZERO
        } else {
            standard_shipping_cost()
        };

        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    /// Subtotal rounded for display.
    #[must_use]
    pub fn subtotal_display(&self) -> Decimal {
        round_display(self.subtotal)
    }

    /// Shipping cost rounded for display.
    #[must_use]
    pub fn shipping_display(&self) -> Decimal {
        round_display(self.shipping)
    }

    /// Grand total rounded for display.
    #[must_use]
    pub fn total_display(&self) -> Decimal {
        round_display(self.total)
    }
}

fn round_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
