use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub product_id: String,
    pub price_id: String,
    pub product_name: String,
    /// Minor currency units
    pub unit_amount: i64,
    pub quantity: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveCartRequest {
    pub items: Vec<CartItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub total_amount: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CartResponse {
    pub fn new(items: Vec<CartItem>, updated_at: Option<DateTime<Utc>>) -> AppResult<Self> {
        let total_amount = items
            .iter()
            .try_fold(0i64, |total, i| {
                i.unit_amount
                    .checked_mul(i64::from(i.quantity))
                    .and_then(|line| total.checked_add(line))
            })
            .ok_or_else(|| AppError::ValidationError("Cart total is too large".to_string()))?;
        Ok(Self {
            items,
            total_amount,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(unit_amount: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: "plaque".to_string(),
            price_id: "price_plaque".to_string(),
            product_name: "Plaque".to_string(),
            unit_amount,
            quantity,
        }
    }

    #[test]
    fn test_total_overflow_is_a_validation_error() {
        let err = CartResponse::new(vec![line(i64::MAX / 2, 3)], None).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = CartResponse::new(vec![line(i64::MAX, 1), line(1, 1)], None).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let ok = CartResponse::new(vec![line(250, 4), line(5, 1)], None).unwrap();
        assert_eq!(ok.total_amount, 1005);
    }
}
