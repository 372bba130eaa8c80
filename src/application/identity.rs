//! Mock identity collaborator: accounts and the signed-in user live in the
//! key-value store.

use crate::application::cart::CART_KEY;
use crate::domain::customer::is_email;
use crate::domain::ports::SharedStore;
use crate::domain::user::{Account, User};
use crate::error::{CheckoutError, FieldErrors, Result};
use crate::infrastructure::codec::{read_json, write_json};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::{info, warn};
use uuid::Uuid;

/// Store key of the registered accounts.
pub const USERS_KEY: &str = "users";
/// Store key of the signed-in user.
pub const AUTH_USER_KEY: &str = "auth_user";

const MIN_NAME_LENGTH: usize = 3;
const MIN_PASSWORD_LENGTH: usize = 6;
const INVALID_CREDENTIALS: &str = "invalid email or password";

#[derive(Clone)]
pub struct IdentityService {
    store: SharedStore,
}

impl IdentityService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Creates an account and signs it in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let name = name.trim();
        let email = email.trim().to_lowercase();

        let mut errors = FieldErrors::default();
        if name.chars().count() < MIN_NAME_LENGTH {
            errors.push("name", format!("must be at least {MIN_NAME_LENGTH} characters"));
        }
        if !is_email(&email) {
            errors.push("email", "invalid email");
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push("password", format!("must be at least {MIN_PASSWORD_LENGTH} characters"));
        }
        errors.into_result()?;

        let mut accounts = self.accounts().await?;
        if accounts.iter().any(|a| a.user.email == email) {
            return Err(CheckoutError::invalid("email", "email is already registered"));
        }

        let user = User {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            email,
        };
        accounts.push(Account {
            user: user.clone(),
            password_hash: hash_password(password)?,
        });
        write_json(self.store.as_ref(), USERS_KEY, &accounts).await?;
        write_json(self.store.as_ref(), AUTH_USER_KEY, &user).await?;

        info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let account = self
            .accounts()
            .await?
            .into_iter()
            .find(|a| a.user.email == email);

        let Some(account) = account else {
            warn!("login for unknown email");
            return Err(CheckoutError::Authentication(INVALID_CREDENTIALS.to_string()));
        };
        if verify_password(password, &account.password_hash).is_err() {
            warn!(user_id = %account.user.id, "login with wrong password");
            return Err(CheckoutError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        write_json(self.store.as_ref(), AUTH_USER_KEY, &account.user).await?;
        info!(user_id = %account.user.id, "signed in");
        Ok(account.user)
    }

    /// Signs out and drops the session cart.
    pub async fn logout(&self) -> Result<()> {
        self.store.remove(AUTH_USER_KEY).await?;
        self.store.remove(CART_KEY).await?;
        info!("signed out");
        Ok(())
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        read_json(self.store.as_ref(), AUTH_USER_KEY).await
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.current_user().await?.is_some())
    }

    async fn accounts(&self) -> Result<Vec<Account>> {
        Ok(read_json(self.store.as_ref(), USERS_KEY)
            .await?
            .unwrap_or_default())
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CheckoutError::Authentication(format!("could not hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| CheckoutError::Authentication(INVALID_CREDENTIALS.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| CheckoutError::Authentication(INVALID_CREDENTIALS.to_string()))
}
