use super::money::Money;
use super::product::Product;
use serde::{Deserialize, Serialize};

/// One product in the cart with its quantity.
///
/// The product fields are flattened next to `quantity` in the persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLineItem {
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    pub fn subtotal(&self) -> Money {
        self.product.price.times(self.quantity)
    }
}

/// The shopper's cart.
///
/// Line items keep insertion order and are keyed by product id. Every quantity
/// stays within `[1, stock]`; totals are always derived from the items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `product` with quantity 1.
    ///
    /// Returns `false` without touching the cart when the product is already
    /// present or has no stock.
    pub fn add_item(&mut self, product: &Product) -> bool {
        if self.contains(&product.id) || !product.in_stock() {
            return false;
        }
        self.items.push(CartLineItem {
            product: product.clone(),
            quantity: 1,
        });
        true
    }

    /// Sets the quantity of a line item if `1 <= quantity <= stock`.
    ///
    /// Out-of-range quantities and unknown ids are ignored.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> bool {
        match self.items.iter_mut().find(|i| i.product_id() == product_id) {
            Some(item) if (1..=item.product.stock).contains(&quantity) => {
                let changed = item.quantity != quantity;
                item.quantity = quantity;
                changed
            }
            _ => false,
        }
    }

    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id() != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.items.iter().any(|i| i.product_id() == product_id)
    }

    pub fn get(&self, product_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn total_price(&self) -> Money {
        self.items.iter().map(CartLineItem::subtotal).sum()
    }
}

impl From<Vec<CartLineItem>> for Cart {
    /// Rebuilds a cart from decoded line items, restoring the invariants:
    /// first occurrence of an id wins, sold-out products are dropped and
    /// quantities are clamped into `[1, stock]`.
    fn from(items: Vec<CartLineItem>) -> Self {
        let mut cart = Cart::new();
        for mut item in items {
            if cart.contains(item.product_id()) || !item.product.in_stock() {
                continue;
            }
            item.quantity = item.quantity.clamp(1, item.product.stock);
            cart.items.push(item);
        }
        cart
    }
}

impl From<Cart> for Vec<CartLineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
