use crate::application::cart::ShoppingCart;
use crate::application::checkout::CheckoutFlow;
use crate::application::identity::IdentityService;
use crate::application::vault::CardVault;
use crate::config::CheckoutConfig;
use crate::domain::ports::SharedStore;
use crate::domain::product::Catalog;
use crate::error::{CheckoutError, Result};
use std::sync::Arc;
use tracing::info;

/// Wires the catalog, cart, vault, identity and checkout over one store.
pub struct Storefront {
    catalog: Catalog,
    cart: Arc<ShoppingCart>,
    vault: CardVault,
    identity: IdentityService,
    checkout: CheckoutFlow,
}

impl Storefront {
    /// Restores the persisted cart and builds the services. The config is
    /// validated first.
    pub async fn open(store: SharedStore, catalog: Catalog, config: CheckoutConfig) -> Result<Self> {
        let config = config.validate()?;
        let cart = Arc::new(ShoppingCart::load(store.clone()).await?);
        let vault = CardVault::new(store.clone());
        let identity = IdentityService::new(store);
        let checkout = CheckoutFlow::new(cart.clone(), vault.clone(), identity.clone(), config);

        info!(products = catalog.len(), "storefront ready");
        Ok(Self {
            catalog,
            cart,
            vault,
            identity,
            checkout,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &ShoppingCart {
        &self.cart
    }

    pub fn vault(&self) -> &CardVault {
        &self.vault
    }

    pub fn identity(&self) -> &IdentityService {
        &self.identity
    }

    pub fn checkout(&self) -> &CheckoutFlow {
        &self.checkout
    }

    /// Adds a catalog product to the cart. Returns `false` if it was already
    /// there or is out of stock.
    pub async fn add_to_cart(&self, product_id: &str) -> Result<bool> {
        let product = self
            .catalog
            .find(product_id)
            .ok_or_else(|| CheckoutError::invalid("product", format!("unknown product '{product_id}'")))?;
        self.cart.add_item(product).await
    }

    /// Signs out and empties the cart.
    pub async fn logout(&self) -> Result<()> {
        self.identity.logout().await?;
        self.cart.clear().await
    }
}
