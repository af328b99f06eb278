/*
 * Responsibility
 * - Products の request/response DTO
 * - validation は validator derive (field 単位のエラーを返す)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::repos::product_repo::ProductRow;

#[derive(Debug, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 0, message = "cost cannot be negative"))]
    pub cost: i32,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "cost cannot be negative"))]
    pub cost: Option<i32>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub cost: i32,
    pub quantity: i32,
    pub sold: i64,
    pub revenue: i64,
    pub user_id: Uuid,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl From<ProductRow> for ProductResponse {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.product_id,
            name: row.name,
            cost: row.cost,
            quantity: row.quantity,
            sold: row.sold,
            revenue: row.revenue,
            user_id: row.user_id,
            date_created: row.date_created,
            date_updated: row.date_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn new_product_reports_every_failing_field() {
        let bad = NewProduct {
            name: "".to_string(),
            cost: -10,
            quantity: 0,
        };

        let err: AppError = bad.validate().unwrap_err().into();
        let AppError::Validation { fields } = err else {
            panic!("expected validation error");
        };

        let mut names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["cost", "name", "quantity"]);
    }

    #[test]
    fn update_product_allows_partial_bodies() {
        let partial = UpdateProduct {
            name: None,
            cost: Some(20),
            quantity: None,
        };
        assert!(partial.validate().is_ok());
    }
}
