use crate::orders::repo::{Order, OrderItemDetail, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: String,
}

#[derive(Debug, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}

/// A merchant's view of an order: only their own items and their share of
/// the value, never the full multi-merchant breakdown.
#[derive(Debug, Serialize)]
pub struct MerchantOrderDetails {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub created_at: OffsetDateTime,
    pub items: Vec<OrderItemDetail>,
    pub merchant_total: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct StatusChange {
    pub order_id: Uuid,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
}
