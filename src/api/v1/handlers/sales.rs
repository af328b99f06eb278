/*
 * Responsibility
 * - /products/{id}/sales 系 handler
 * - 追加は対象 product の存在を先に確認 (FK violation を 500 にしない)
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
    api::v1::dto::sales::{NewSale, SaleResponse},
    error::AppError,
    repos::{product_repo, sale_repo},
    state::AppState,
};

pub async fn create(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(new_sale): Json<NewSale>,
) -> Result<(StatusCode, Json<SaleResponse>), AppError> {
    new_sale.validate()?;

    if product_repo::get(&state.db, product_id).await?.is_none() {
        return Err(AppError::not_found("product"));
    }

    let row = sale_repo::create(
        &state.db,
        product_id,
        new_sale.quantity,
        new_sale.paid,
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn list(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Vec<SaleResponse>>, AppError> {
    let rows = sale_repo::list(&state.db, product_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
