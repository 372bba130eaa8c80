//! Application services orchestrating the domain over the storage port.
//!
//! [`storefront::Storefront`] is the entry point: it owns the cart, the card
//! vault, the identity service and the [`checkout::CheckoutFlow`] that runs
//! the payment simulator.

pub mod cart;
pub mod checkout;
pub mod identity;
pub mod simulator;
pub mod storefront;
pub mod vault;
