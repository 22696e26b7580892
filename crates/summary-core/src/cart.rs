//! # Cart Records
//!
//! Plain records for carts and orders as handed over by the persistence
//! layer. The summary engine only ever reads them, through [`CartLike`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product as seen by the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Unit price
    pub price: Decimal,
}

impl Product {
    /// Create a new product
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// A line in a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Item id; assigned in insertion order
    pub id: u64,

    /// Product snapshot
    pub product: Product,

    /// Quantity
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CartItem {
    /// Calculate the total price for this line, `None` on overflow
    pub fn line_total(&self) -> Option<Decimal> {
        crate::money::line_total(self.product.price, self.quantity)
    }
}

/// A percentage-off voucher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Voucher id
    #[serde(default)]
    pub id: u64,

    /// Redemption code
    pub code: String,

    /// Percent off the items total (10 = 10%)
    pub percent: Decimal,
}

impl Voucher {
    /// Create a new voucher
    pub fn new(code: impl Into<String>, percent: Decimal) -> Self {
        Self {
            id: 0,
            code: code.into(),
            percent,
        }
    }
}

/// Read access the summary engine needs from a cart-like record
pub trait CartLike {
    /// Items in natural order, or `None` when the record carries no item collection
    fn line_items(&self) -> Option<&[CartItem]>;

    /// Attached vouchers
    fn vouchers(&self) -> &[Voucher] {
        &[]
    }
}

/// A shopping cart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart id
    #[serde(default)]
    pub id: u64,

    /// Items in insertion order
    #[serde(default)]
    pub items: Vec<CartItem>,

    /// Attached vouchers
    #[serde(default)]
    pub vouchers: Vec<Voucher>,
}

impl Cart {
    /// Create an empty cart
    pub fn new(id: u64) -> Self {
        Self {
            id,
            items: Vec::new(),
            vouchers: Vec::new(),
        }
    }

    /// Add a product with quantity, returning the new item id
    pub fn add_product(&mut self, product: Product, quantity: u32) -> u64 {
        let id = self.items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        self.items.push(CartItem {
            id,
            product,
            quantity,
        });
        id
    }

    /// Attach a voucher, returning its id
    pub fn add_voucher(&mut self, mut voucher: Voucher) -> u64 {
        voucher.id = self.vouchers.iter().map(|v| v.id).max().unwrap_or(0) + 1;
        let id = voucher.id;
        self.vouchers.push(voucher);
        id
    }

    /// Check if cart is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get item count
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, i| count.saturating_add(i.quantity))
    }
}

impl CartLike for Cart {
    fn line_items(&self) -> Option<&[CartItem]> {
        Some(&self.items)
    }

    fn vouchers(&self) -> &[Voucher] {
        &self.vouchers
    }
}

/// An order placed from a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID (generated)
    pub id: String,

    /// Items copied from the cart
    #[serde(default)]
    pub items: Vec<CartItem>,

    /// Vouchers copied from the cart
    #[serde(default)]
    pub vouchers: Vec<Voucher>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new, empty order with generated ID
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            items: Vec::new(),
            vouchers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Place an order from the current cart contents
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            items: cart.items.clone(),
            vouchers: cart.vouchers.clone(),
            ..Self::new()
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

impl CartLike for Order {
    fn line_items(&self) -> Option<&[CartItem]> {
        Some(&self.items)
    }

    fn vouchers(&self) -> &[Voucher] {
        &self.vouchers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let item = CartItem {
            id: 1,
            product: Product::new("p1", "Stamp", Decimal::new(1, 2)),
            quantity: 7,
        };

        assert_eq!(item.line_total(), Some(Decimal::new(7, 2)));
    }

    #[test]
    fn test_item_ids_follow_insertion() {
        let mut cart = Cart::new(1);
        let first = cart.add_product(Product::new("p1", "Stamp", Decimal::new(1, 2)), 1);
        let second = cart.add_product(Product::new("p2", "Atlas", Decimal::new(1122, 2)), 2);

        assert_eq!((first, second), (1, 2));
        assert_eq!(cart.item_count(), 3);
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_order_copies_cart() {
        let mut cart = Cart::new(9);
        cart.add_product(Product::new("p1", "Stamp", Decimal::new(1, 2)), 1);
        cart.add_voucher(Voucher::new("MATES", Decimal::from(10)));

        let order = Order::from_cart(&cart);

        assert_eq!(order.line_items().map(<[CartItem]>::len), Some(1));
        assert_eq!(order.vouchers()[0].code, "MATES");
        assert_eq!(order.vouchers()[0].id, 1);
        assert!(!order.id.is_empty());
    }

    #[test]
    fn test_cart_from_json_defaults() {
        let cart: Cart = serde_json::from_str(
            r#"{"items": [{"id": 1, "product": {"id": "p1", "price": "11.22"}}]}"#,
        )
        .unwrap();

        assert_eq!(cart.items[0].quantity, 1);
        assert_eq!(cart.items[0].product.price, Decimal::new(1122, 2));
        assert!(cart.vouchers.is_empty());
    }
}
