use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Business {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub contact_email: Option<String>,
}

impl Business {
    /// A merchant owns at most one business.
    pub async fn find_by_owner(db: &PgPool, owner_id: Uuid) -> anyhow::Result<Option<Business>> {
        let business = sqlx::query_as::<_, Business>(
            r#"
            SELECT id, owner_id, name, description, contact_email
            FROM businesses
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(db)
        .await?;
        Ok(business)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Business>> {
        let business = sqlx::query_as::<_, Business>(
            r#"
            SELECT id, owner_id, name, description, contact_email
            FROM businesses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(business)
    }

    pub async fn create(
        db: &PgPool,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
        contact_email: &str,
    ) -> anyhow::Result<Business> {
        let business = sqlx::query_as::<_, Business>(
            r#"
            INSERT INTO businesses (owner_id, name, description, contact_email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, description, contact_email
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .bind(contact_email)
        .fetch_one(db)
        .await?;
        Ok(business)
    }
}
