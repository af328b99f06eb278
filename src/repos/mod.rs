/*
 * Responsibility
 * - DB アクセス層の公開ポイント
 * - 接続確認 (health check 用)
 */
pub mod error;
pub mod product_repo;
pub mod sale_repo;
pub mod user_repo;

use sqlx::PgPool;

use error::RepoError;

/// Round-trip a trivial query to confirm the database answers.
pub async fn status_check(db: &PgPool) -> Result<(), RepoError> {
    sqlx::query_scalar::<_, bool>("SELECT true")
        .fetch_one(db)
        .await?;
    Ok(())
}
