use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::external::{CheckoutRequest, PaymentGateway};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::utils::{NonFatal, require_field};
use std::sync::Arc;

const MAX_QUANTITY: u64 = 99;

/// Hosted checkout for the memorial plaque shop.
#[derive(Clone)]
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    app: AppConfig,
}

impl PaymentService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, app: AppConfig) -> Self {
        Self { gateway, app }
    }

    /// Signed-in buyers are attached to a processor customer when possible; any
    /// failure there falls back to a guest checkout.
    pub async fn create_checkout(
        &self,
        caller: Option<&AuthUser>,
        request: CreateCheckoutRequest,
    ) -> AppResult<CheckoutSessionResponse> {
        let product_id = require_field(request.product_id.as_deref(), "productId")?;
        let price_id = require_field(request.price_id.as_deref(), "priceId")?;
        let product_name = require_field(request.product_name.as_deref(), "productName")?;
        let quantity = request.quantity.unwrap_or(1);
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(AppError::ValidationError(format!(
                "quantity must be between 1 and {MAX_QUANTITY}"
            )));
        }

        let customer_id = match caller {
            Some(user) => NonFatal::tolerate(
                "payment customer lookup",
                self.gateway
                    .find_or_create_customer(&user.email, &user.user_id)
                    .await,
            )
            .ok(),
            None => None,
        };

        let checkout = CheckoutRequest {
            product_id,
            price_id,
            product_name,
            quantity,
            customer_email: caller.map(|u| u.email.clone()),
            user_id: caller.map(|u| u.user_id.clone()),
            customer_id,
            success_url: self.app.checkout_success_url(),
            cancel_url: self.app.checkout_cancel_url(),
        };
        let session = self.gateway.create_checkout_session(&checkout).await?;
        if session.url.is_empty() {
            return Err(AppError::ExternalApiError(
                "Payment processor returned no checkout URL".to_string(),
            ));
        }

        log::info!(
            "Checkout session {} created for product {}",
            session.id,
            checkout.product_id
        );
        Ok(CheckoutSessionResponse {
            session_id: session.id,
            url: session.url,
        })
    }
}
