/*
 * Responsibility
 * - /products 系 CRUD handler
 * - Path/Json を extractor で受け、DTO validation → repo 呼び出し
 * - update は所有者 (作成者) か ADMIN のみ許可
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::v1::dto::products::{NewProduct, ProductResponse, UpdateProduct},
    error::AppError,
    repos::product_repo,
    services::auth::{Claims, ROLE_ADMIN},
    state::AppState,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let rows = product_repo::list(&state.db).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    let row = product_repo::get(&state.db, product_id)
        .await?
        .ok_or_else(|| AppError::not_found("product"))?;

    Ok(Json(row.into()))
}

pub async fn create(
    State(state): State<AppState>,
    claims: Claims,
    Json(new_product): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    new_product.validate()?;

    // Tokens issued here always carry a uuid subject; anything else means the
    // claims were built wrong, not that the client misbehaved.
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::internal("claims subject is not a user id"))?;

    let row = product_repo::create(
        &state.db,
        &new_product.name,
        new_product.cost,
        new_product.quantity,
        user_id,
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update(
    State(state): State<AppState>,
    claims: Claims,
    Path(product_id): Path<Uuid>,
    Json(update): Json<UpdateProduct>,
) -> Result<StatusCode, AppError> {
    update.validate()?;

    let existing = product_repo::get(&state.db, product_id)
        .await?
        .ok_or_else(|| AppError::not_found("product"))?;

    if existing.user_id.to_string() != claims.sub && !claims.has_role(&[ROLE_ADMIN]) {
        return Err(AppError::Forbidden);
    }

    let updated = product_repo::update(
        &state.db,
        product_id,
        update.name.as_deref(),
        update.cost,
        update.quantity,
        Utc::now(),
    )
    .await?;

    if !updated {
        return Err(AppError::not_found("product"));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = product_repo::delete(&state.db, product_id).await?;

    if !deleted {
        return Err(AppError::not_found("product"));
    }

    Ok(StatusCode::NO_CONTENT)
}
