use serde::{Deserialize, Serialize};

/// The signed-in shopper as seen by the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A registered account as kept by the identity store.
///
/// `password_hash` is an Argon2id PHC string and never leaves the identity
/// service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(flatten)]
    pub user: User,
    pub password_hash: String,
}
