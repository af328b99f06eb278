/*
 * Responsibility
 * - Sales の request/response DTO
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::repos::sale_repo::SaleRow;

#[derive(Debug, Deserialize, Validate)]
pub struct NewSale {
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(range(min = 0, message = "paid cannot be negative"))]
    pub paid: i32,
}

#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub paid: i32,
    pub date_created: DateTime<Utc>,
}

impl From<SaleRow> for SaleResponse {
    fn from(row: SaleRow) -> Self {
        Self {
            id: row.sale_id,
            product_id: row.product_id,
            quantity: row.quantity,
            paid: row.paid,
            date_created: row.date_created,
        }
    }
}
