use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

/// Immutable once created, except `status`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub created_at: OffsetDateTime,
}

/// Price and quantity snapshot taken at checkout; later product price
/// changes never alter it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_time: Decimal,
}

/// Order item joined with the product name for display.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItemDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price_at_time: Decimal,
}

impl Order {
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, total_amount, status, shipping_address, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(orders)
    }

    /// Caller-scoped lookup; a foreign order is indistinguishable from a
    /// missing one.
    pub async fn find_owned(
        db: &PgPool,
        order_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, total_amount, status, shipping_address, created_at
            FROM orders
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(order)
    }

    pub async fn find_by_id(db: &PgPool, order_id: Uuid) -> anyhow::Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, total_amount, status, shipping_address, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(db)
        .await?;
        Ok(order)
    }

    /// Distinct orders containing at least one item sold by the business.
    /// A merchant never sees orders made up solely of other catalogs.
    pub async fn list_for_business(db: &PgPool, business_id: Uuid) -> anyhow::Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT DISTINCT o.id, o.user_id, o.total_amount, o.status, o.shipping_address,
                   o.created_at
            FROM orders o
            JOIN order_items oi ON oi.order_id = o.id
            JOIN products p ON p.id = oi.product_id
            WHERE p.business_id = $1
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(business_id)
        .fetch_all(db)
        .await?;
        Ok(orders)
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        total_amount: Decimal,
        shipping_address: &str,
    ) -> anyhow::Result<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, total_amount, shipping_address)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, total_amount, status, shipping_address, created_at
            "#,
        )
        .bind(user_id)
        .bind(total_amount)
        .bind(shipping_address)
        .fetch_one(&mut **tx)
        .await?;
        Ok(order)
    }

    pub async fn set_status(
        db: &PgPool,
        order_id: Uuid,
        status: OrderStatus,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order_id)
            .bind(status)
            .execute(db)
            .await?;
        Ok(())
    }
}

impl OrderItem {
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        price_at_time: Decimal,
    ) -> anyhow::Result<OrderItem> {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price_at_time)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, product_id, quantity, price_at_time
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(price_at_time)
        .fetch_one(&mut **tx)
        .await?;
        Ok(item)
    }
}

impl OrderItemDetail {
    pub async fn list_for_order(db: &PgPool, order_id: Uuid) -> anyhow::Result<Vec<OrderItemDetail>> {
        let items = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT oi.id, oi.product_id, p.name AS product_name, oi.quantity, oi.price_at_time
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(order_id)
        .fetch_all(db)
        .await?;
        Ok(items)
    }

    /// Only the slice of the order sold by this business.
    pub async fn list_for_order_and_business(
        db: &PgPool,
        order_id: Uuid,
        business_id: Uuid,
    ) -> anyhow::Result<Vec<OrderItemDetail>> {
        let items = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT oi.id, oi.product_id, p.name AS product_name, oi.quantity, oi.price_at_time
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1 AND p.business_id = $2
            ORDER BY p.name
            "#,
        )
        .bind(order_id)
        .bind(business_id)
        .fetch_all(db)
        .await?;
        Ok(items)
    }
}

/// True when the order carries at least one item from the business's catalog.
pub async fn business_sells_in_order(
    db: &PgPool,
    order_id: Uuid,
    business_id: Uuid,
) -> anyhow::Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1 AND p.business_id = $2
        )
        "#,
    )
    .bind(order_id)
    .bind(business_id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

/// Deduct sold stock inside the checkout transaction. The predicate repeats
/// the stock check so the non-negative invariant holds even if a row slipped
/// past validation.
pub async fn deduct_stock(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - $2
        WHERE id = $1 AND stock_quantity >= $2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() != 1 {
        anyhow::bail!("stock for product {product_id} changed during checkout");
    }
    Ok(())
}

pub async fn clear_cart_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"cancelled\"").unwrap(),
            OrderStatus::Cancelled
        );
    }
}
