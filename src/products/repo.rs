use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category: String,
    pub is_active: bool,
}

/// Catalog row joined with the selling business, for public listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category: String,
    pub business_name: String,
}

impl Product {
    pub async fn list_active(db: &PgPool) -> anyhow::Result<Vec<CatalogEntry>> {
        let rows = sqlx::query_as::<_, CatalogEntry>(
            r#"
            SELECT p.id, p.name, p.description, p.price, p.stock_quantity, p.category,
                   b.name AS business_name
            FROM products p
            JOIN businesses b ON b.id = p.business_id
            WHERE p.is_active
            ORDER BY p.category, p.name
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn search_active(db: &PgPool, term: &str) -> anyhow::Result<Vec<CatalogEntry>> {
        let rows = sqlx::query_as::<_, CatalogEntry>(
            r#"
            SELECT p.id, p.name, p.description, p.price, p.stock_quantity, p.category,
                   b.name AS business_name
            FROM products p
            JOIN businesses b ON b.id = p.business_id
            WHERE p.is_active AND (p.name ILIKE $1 OR p.category ILIKE $1)
            ORDER BY p.category, p.name
            "#,
        )
        .bind(format!("%{}%", term))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, business_id, name, description, price, stock_quantity, category, is_active
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    /// Only active products can be carted or purchased.
    pub async fn find_active_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, business_id, name, description, price, stock_quantity, category, is_active
            FROM products
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    pub async fn list_by_business(db: &PgPool, business_id: Uuid) -> anyhow::Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, business_id, name, description, price, stock_quantity, category, is_active
            FROM products
            WHERE business_id = $1
            ORDER BY category, name
            "#,
        )
        .bind(business_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        db: &PgPool,
        business_id: Uuid,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        stock_quantity: i32,
        category: &str,
    ) -> anyhow::Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (business_id, name, description, price, stock_quantity, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, business_id, name, description, price, stock_quantity, category, is_active
            "#,
        )
        .bind(business_id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock_quantity)
        .bind(category)
        .fetch_one(db)
        .await?;
        Ok(product)
    }

    /// Update a product, scoped to its owning business. Returns `None` when
    /// the product does not exist or belongs to another business.
    pub async fn update_owned(
        db: &PgPool,
        id: Uuid,
        business_id: Uuid,
        price: Option<Decimal>,
        stock_quantity: Option<i32>,
        is_active: Option<bool>,
    ) -> anyhow::Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET price          = COALESCE($3, price),
                stock_quantity = COALESCE($4, stock_quantity),
                is_active      = COALESCE($5, is_active)
            WHERE id = $1 AND business_id = $2
            RETURNING id, business_id, name, description, price, stock_quantity, category, is_active
            "#,
        )
        .bind(id)
        .bind(business_id)
        .bind(price)
        .bind(stock_quantity)
        .bind(is_active)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }
}
