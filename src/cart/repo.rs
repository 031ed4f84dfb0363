use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

/// One cart line joined with the current product state. `unit_price`,
/// `stock_quantity` and `is_active` are live values; nothing here is a
/// snapshot until checkout turns the line into an order item.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub stock_quantity: i32,
    pub is_active: bool,
}

impl CartItem {
    pub async fn find_for_product(
        db: &PgPool,
        user_id: Uuid,
        product_id: Uuid,
    ) -> anyhow::Result<Option<CartItem>> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT id, user_id, product_id, quantity
            FROM cart_items
            WHERE user_id = $1 AND product_id = $2
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(db)
        .await?;
        Ok(item)
    }

    pub async fn find_owned(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<CartItem>> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT id, user_id, product_id, quantity
            FROM cart_items
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(item)
    }

    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> anyhow::Result<CartItem> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, product_id, quantity
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(db)
        .await?;
        Ok(item)
    }

    pub async fn set_quantity(db: &PgPool, id: Uuid, quantity: i32) -> anyhow::Result<CartItem> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items
            SET quantity = $2
            WHERE id = $1
            RETURNING id, user_id, product_id, quantity
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_one(db)
        .await?;
        Ok(item)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// No-op when the cart is already empty.
    pub async fn clear(db: &PgPool, user_id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}

impl CartLine {
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT c.id, c.product_id, p.name AS product_name, p.price AS unit_price,
                   c.quantity, p.stock_quantity, p.is_active
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(lines)
    }

    /// Same join inside a checkout transaction, with the product rows locked
    /// so stock validation and the later decrement see the same counts.
    pub async fn lock_for_user(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT c.id, c.product_id, p.name AS product_name, p.price AS unit_price,
                   c.quantity, p.stock_quantity, p.is_active
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY p.id
            FOR UPDATE OF p
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(lines)
    }
}
