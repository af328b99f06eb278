/*
 * Responsibility
 * - products テーブル向け SQLx 操作
 * - 一覧/取得は sales を集計して sold / revenue を含める
 * - DB エラーは RepoError に変換しやすい形で返す
 */
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub product_id: Uuid,
    pub name: String,
    pub cost: i32,
    pub quantity: i32,
    pub user_id: Uuid,
    pub sold: i64,
    pub revenue: i64,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

pub async fn list(db: &PgPool) -> Result<Vec<ProductRow>, RepoError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT
            p.product_id, p.name, p.cost, p.quantity, p.user_id,
            COALESCE(SUM(s.quantity), 0)::bigint AS sold,
            COALESCE(SUM(s.paid), 0)::bigint AS revenue,
            p.date_created, p.date_updated
        FROM products AS p
        LEFT JOIN sales AS s ON p.product_id = s.product_id
        GROUP BY p.product_id
        ORDER BY p.product_id
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, product_id: Uuid) -> Result<Option<ProductRow>, RepoError> {
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT
            p.product_id, p.name, p.cost, p.quantity, p.user_id,
            COALESCE(SUM(s.quantity), 0)::bigint AS sold,
            COALESCE(SUM(s.paid), 0)::bigint AS revenue,
            p.date_created, p.date_updated
        FROM products AS p
        LEFT JOIN sales AS s ON p.product_id = s.product_id
        WHERE p.product_id = $1
        GROUP BY p.product_id
        "#,
    )
    .bind(product_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(
    db: &PgPool,
    name: &str,
    cost: i32,
    quantity: i32,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<ProductRow, RepoError> {
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        INSERT INTO products (product_id, name, cost, quantity, user_id, date_created, date_updated)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING
            product_id, name, cost, quantity, user_id,
            0::bigint AS sold, 0::bigint AS revenue,
            date_created, date_updated
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(cost)
    .bind(quantity)
    .bind(user_id)
    .bind(now)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    product_id: Uuid,
    name: Option<&str>,
    cost: Option<i32>,
    quantity: Option<i32>,
    now: DateTime<Utc>,
) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET
            name = COALESCE($2, name),
            cost = COALESCE($3, cost),
            quantity = COALESCE($4, quantity),
            date_updated = $5
        WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .bind(name)
    .bind(cost)
    .bind(quantity)
    .bind(now)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(db: &PgPool, product_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM products
        WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
