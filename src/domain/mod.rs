//! Domain model: cart, cards, customer data, payments and the checkout
//! session, plus the ports the application layer talks through.

pub mod card;
pub mod cart;
pub mod customer;
pub mod money;
pub mod payment;
pub mod ports;
pub mod product;
pub mod session;
pub mod user;
