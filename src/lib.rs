//! Storefront
//!
//! Client-side cart and ordering core for a deliberately vulnerable demo
//! storefront. The crate owns the durable shopping cart, its derived summary,
//! and order submission against the external shop API; the acting identity and
//! resource identifiers on every request are explicit parameters so the
//! authorization flaws the demo teaches stay visible and testable.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod session;
