/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - password_hash は bcrypt 済みの文字列を受け取る (ハッシュ化は上位)
 */
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub password_hash: String,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

pub async fn create(
    db: &PgPool,
    name: &str,
    email: &str,
    roles: &[String],
    password_hash: &str,
    now: DateTime<Utc>,
) -> Result<UserRow, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (user_id, name, email, roles, password_hash, date_created, date_updated)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING user_id, name, email, roles, password_hash, date_created, date_updated
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(roles)
    .bind(password_hash)
    .bind(now)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn get_by_email(db: &PgPool, email: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT user_id, name, email, roles, password_hash, date_created, date_updated
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
