/*
 * Responsibility
 * - sales テーブル向け SQLx 操作
 * - product_id の FK (CASCADE) 前提で削除挙動を意識
 */
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SaleRow {
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub paid: i32,
    pub date_created: DateTime<Utc>,
}

pub async fn create(
    db: &PgPool,
    product_id: Uuid,
    quantity: i32,
    paid: i32,
    now: DateTime<Utc>,
) -> Result<SaleRow, RepoError> {
    let row = sqlx::query_as::<_, SaleRow>(
        r#"
        INSERT INTO sales (sale_id, product_id, quantity, paid, date_created)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING sale_id, product_id, quantity, paid, date_created
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind(quantity)
    .bind(paid)
    .bind(now)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn list(db: &PgPool, product_id: Uuid) -> Result<Vec<SaleRow>, RepoError> {
    let rows = sqlx::query_as::<_, SaleRow>(
        r#"
        SELECT sale_id, product_id, quantity, paid, date_created
        FROM sales
        WHERE product_id = $1
        ORDER BY date_created
        "#,
    )
    .bind(product_id)
    .fetch_all(db)
    .await?;

    Ok(rows)
}
