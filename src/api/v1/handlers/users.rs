/*
 * Responsibility
 * - GET /users/token : Basic auth (email/password) → JWT 発行
 * - POST /users : ユーザー作成 (ADMIN のみ、route 側で enforce)
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{Duration, Utc};
use validator::Validate;

use crate::{
    api::v1::dto::users::{NewUser, TokenResponse, UserResponse},
    error::AppError,
    repos::user_repo,
    services::auth::Claims,
    state::AppState,
};

pub async fn token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let (email, password) = basic_credentials(&headers)?;

    // Same failure for unknown email and bad password: no account probing.
    let user = user_repo::get_by_email(&state.db, &email)
        .await?
        .ok_or_else(authentication_failed)?;

    let valid = bcrypt::verify(&password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("verifying password: {e}")))?;
    if !valid {
        return Err(authentication_failed());
    }

    let claims = Claims::new(
        user.user_id.to_string(),
        user.roles,
        Utc::now(),
        Duration::hours(1),
    );
    let token = state
        .auth
        .generate_token(&claims)
        .map_err(|e| AppError::internal(format!("generating token: {e}")))?;

    Ok(Json(TokenResponse { token }))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    new_user.validate()?;

    let password_hash = bcrypt::hash(&new_user.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("hashing password: {e}")))?;

    let row = user_repo::create(
        &state.db,
        &new_user.name,
        &new_user.email,
        &new_user.roles,
        &password_hash,
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), AppError> {
    let encoded = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .ok_or_else(must_provide_basic)?;

    let decoded = STANDARD.decode(encoded).map_err(|_| must_provide_basic())?;
    let decoded = String::from_utf8(decoded).map_err(|_| must_provide_basic())?;

    let (email, password) = decoded.split_once(':').ok_or_else(must_provide_basic)?;
    Ok((email.to_string(), password.to_string()))
}

fn must_provide_basic() -> AppError {
    AppError::unauthorized("must provide email and password in basic auth")
}

fn authentication_failed() -> AppError {
    AppError::unauthorized("authentication failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn decodes_basic_credentials() {
        let encoded = STANDARD.encode("ada@example.com:correct horse");
        let headers = headers_with(&format!("Basic {encoded}"));

        let (email, password) = basic_credentials(&headers).unwrap();
        assert_eq!(email, "ada@example.com");
        assert_eq!(password, "correct horse");
    }

    #[test]
    fn password_may_contain_colons() {
        let encoded = STANDARD.encode("ada@example.com:a:b:c");
        let headers = headers_with(&format!("Basic {encoded}"));

        let (_, password) = basic_credentials(&headers).unwrap();
        assert_eq!(password, "a:b:c");
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(basic_credentials(&HeaderMap::new()).is_err());
    }

    #[test]
    fn bearer_header_is_rejected() {
        let headers = headers_with("Bearer some.token");
        assert!(basic_credentials(&headers).is_err());
    }
}
