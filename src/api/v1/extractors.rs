/*
 * Responsibility
 * - handler が Claims を引数で受け取るための extractor
 * - auth middleware が extensions に insert 済みである前提
 * - 見つからない場合は配線ミス (認証必須ルートにしか現れない型) なので 500
 */
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::services::auth::Claims;

impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| AppError::internal("claims missing from request context"))
    }
}
