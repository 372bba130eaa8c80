use crate::domain::cart::Cart;
use crate::domain::money::Money;
use crate::domain::ports::SharedStore;
use crate::domain::product::Product;
use crate::error::Result;
use crate::infrastructure::codec::{read_json, write_json};
use tokio::sync::RwLock;
use tracing::debug;

/// Store key of the current session cart.
pub const CART_KEY: &str = "cart";

/// The session cart, written through to the key-value store.
///
/// Every mutation that changes the cart is persisted before the call
/// returns, so the next read in the same flow sees it.
pub struct ShoppingCart {
    cart: RwLock<Cart>,
    store: SharedStore,
}

impl ShoppingCart {
    /// Restores the persisted cart, or starts empty.
    pub async fn load(store: SharedStore) -> Result<Self> {
        let cart = read_json::<Cart>(store.as_ref(), CART_KEY)
            .await?
            .unwrap_or_default();
        Ok(Self {
            cart: RwLock::new(cart),
            store,
        })
    }

    pub async fn add_item(&self, product: &Product) -> Result<bool> {
        let mut cart = self.cart.write().await;
        let mut next = cart.clone();
        if !next.add_item(product) {
            debug!(product_id = %product.id, stock = product.stock, "add to cart ignored");
            return Ok(false);
        }
        self.commit(&mut cart, next).await?;
        Ok(true)
    }

    pub async fn update_quantity(&self, product_id: &str, quantity: u32) -> Result<bool> {
        let mut cart = self.cart.write().await;
        let mut next = cart.clone();
        if !next.update_quantity(product_id, quantity) {
            debug!(product_id, quantity, "quantity update ignored");
            return Ok(false);
        }
        self.commit(&mut cart, next).await?;
        Ok(true)
    }

    pub async fn remove_item(&self, product_id: &str) -> Result<bool> {
        let mut cart = self.cart.write().await;
        let mut next = cart.clone();
        if !next.remove_item(product_id) {
            return Ok(false);
        }
        self.commit(&mut cart, next).await?;
        Ok(true)
    }

    /// Empties the cart and drops it from the store.
    pub async fn clear(&self) -> Result<()> {
        let mut cart = self.cart.write().await;
        self.store.remove(CART_KEY).await?;
        cart.clear();
        Ok(())
    }

    /// Persists `next` and only then makes it the current cart.
    async fn commit(&self, current: &mut Cart, next: Cart) -> Result<()> {
        write_json(self.store.as_ref(), CART_KEY, &next).await?;
        *current = next;
        Ok(())
    }

    /// A copy of the current cart.
    pub async fn snapshot(&self) -> Cart {
        self.cart.read().await.clone()
    }

    pub async fn contains(&self, product_id: &str) -> bool {
        self.cart.read().await.contains(product_id)
    }

    pub async fn quantity_of(&self, product_id: &str) -> Option<u32> {
        self.cart.read().await.get(product_id).map(|item| item.quantity)
    }

    pub async fn is_empty(&self) -> bool {
        self.cart.read().await.is_empty()
    }

    pub async fn total_item_count(&self) -> u32 {
        self.cart.read().await.total_item_count()
    }

    pub async fn total_price(&self) -> Money {
        self.cart.read().await.total_price()
    }
}
