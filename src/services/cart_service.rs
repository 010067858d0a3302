use crate::entities::cart_entity as carts;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::require_field;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

const MAX_ITEMS: usize = 50;
/// Minor currency units
const MAX_UNIT_AMOUNT: i64 = 10_000_000;

/// Persisted shopping cart, one per user.
#[derive(Clone)]
pub struct CartService {
    pool: DatabaseConnection,
}

fn validate_items(items: &[CartItem]) -> AppResult<()> {
    if items.len() > MAX_ITEMS {
        return Err(AppError::ValidationError(format!(
            "A cart holds at most {MAX_ITEMS} items"
        )));
    }
    for item in items {
        require_field(Some(&item.product_id), "product_id")?;
        require_field(Some(&item.price_id), "price_id")?;
        if !(1..=99).contains(&item.quantity) {
            return Err(AppError::ValidationError(
                "quantity must be between 1 and 99".to_string(),
            ));
        }
        if !(0..=MAX_UNIT_AMOUNT).contains(&item.unit_amount) {
            return Err(AppError::ValidationError(format!(
                "unit_amount must be between 0 and {MAX_UNIT_AMOUNT}"
            )));
        }
    }
    Ok(())
}

impl CartService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn load(&self, user_id: &str) -> AppResult<CartResponse> {
        let cart = carts::Entity::find_by_id(user_id.to_string())
            .one(&self.pool)
            .await?;
        match cart {
            Some(cart) => {
                let items: Vec<CartItem> = serde_json::from_value(cart.items)?;
                CartResponse::new(items, Some(cart.updated_at))
            }
            None => CartResponse::new(Vec::new(), None),
        }
    }

    /// Replaces the whole cart.
    pub async fn save(&self, user_id: &str, request: SaveCartRequest) -> AppResult<CartResponse> {
        validate_items(&request.items)?;
        let updated_at = Utc::now();
        let response = CartResponse::new(request.items, Some(updated_at))?;
        let cart = carts::ActiveModel {
            user_id: Set(user_id.to_string()),
            items: Set(serde_json::to_value(&response.items)?),
            updated_at: Set(updated_at),
        };
        carts::Entity::insert(cart)
            .on_conflict(
                OnConflict::column(carts::Column::UserId)
                    .update_columns([carts::Column::Items, carts::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserType;
    use crate::test_support::*;

    fn item(product: &str, unit_amount: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: product.to_string(),
            price_id: format!("price_{product}"),
            product_name: product.to_string(),
            unit_amount,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_empty_then_saved_cart() {
        let db = setup_test_db().await;
        let user = insert_user(&db, "shopper@example.com", UserType::Customer).await;
        let carts = CartService::new(db);

        let empty = carts.load(&user).await.unwrap();
        assert!(empty.items.is_empty());
        assert_eq!(empty.total_amount, 0);

        let saved = carts
            .save(
                &user,
                SaveCartRequest {
                    items: vec![item("plaque", 4999, 2), item("stand", 1500, 1)],
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.total_amount, 11498);

        carts
            .save(
                &user,
                SaveCartRequest {
                    items: vec![item("stand", 1500, 3)],
                },
            )
            .await
            .unwrap();
        let loaded = carts.load(&user).await.unwrap();
        assert_eq!(loaded.items, vec![item("stand", 1500, 3)]);
        assert_eq!(loaded.total_amount, 4500);
    }

    #[tokio::test]
    async fn test_rejects_bad_quantities() {
        let db = setup_test_db().await;
        let user = insert_user(&db, "shopper@example.com", UserType::Customer).await;
        let carts = CartService::new(db);

        for bad in [item("plaque", 4999, 0), item("plaque", 4999, 100), item("", 100, 1)] {
            let err = carts
                .save(&user, SaveCartRequest { items: vec![bad] })
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
    }

    #[tokio::test]
    async fn test_rejects_amounts_that_overflow_the_total() {
        let db = setup_test_db().await;
        let user = insert_user(&db, "shopper@example.com", UserType::Customer).await;
        let carts = CartService::new(db);

        for bad in [item("plaque", i64::MAX / 2, 3), item("plaque", MAX_UNIT_AMOUNT + 1, 1)] {
            let err = carts
                .save(&user, SaveCartRequest { items: vec![bad] })
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }

        let saved = carts
            .save(
                &user,
                SaveCartRequest {
                    items: vec![item("plaque", MAX_UNIT_AMOUNT, 99)],
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.total_amount, MAX_UNIT_AMOUNT * 99);
        assert!(carts.load(&user).await.unwrap().items.len() == 1);
    }
}
