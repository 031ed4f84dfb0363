use crate::cart::repo::{CartItem, CartLine};
use crate::cart::services::CartTotals;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

/// The caller's cart with tax-inclusive totals. An empty cart is a valid
/// view with zero totals, not an error.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    #[serde(flatten)]
    pub totals: CartTotals,
}

/// Quantity updates at zero or below remove the line instead.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UpdateCartResponse {
    Updated(CartItem),
    Removed { removed: bool },
}
