use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/payments/checkout",
    tag = "payments",
    request_body = CreateCheckoutRequest,
    responses(
        (status = 200, description = "Hosted checkout session", body = CheckoutSessionResponse),
        (status = 400, description = "Missing product fields"),
        (status = 502, description = "Payment processor error")
    )
)]
pub async fn create_checkout(
    payment_service: web::Data<PaymentService>,
    user: Option<AuthUser>,
    request: web::Json<CreateCheckoutRequest>,
) -> Result<HttpResponse> {
    match payment_service
        .create_checkout(user.as_ref(), request.into_inner())
        .await
    {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": session
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/payments").route("/checkout", web::post().to(create_checkout)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::test_support::FakePaymentGateway;
    use actix_web::{App, test};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_guest_checkout_and_missing_fields() {
        let gateway = Arc::new(FakePaymentGateway::default());
        let payments = PaymentService::new(
            gateway.clone(),
            AppConfig {
                frontend_url: "https://workersmate.test".to_string(),
            },
        );
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(payments))
                .configure(payment_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/payments/checkout")
            .set_json(json!({
                "productId": "prod_plaque",
                "priceId": "price_123",
                "productName": "Memorial QR Plaque"
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert!(body["data"]["url"].as_str().is_some_and(|u| !u.is_empty()));

        let req = test::TestRequest::post()
            .uri("/payments/checkout")
            .set_json(json!({ "productId": "prod_plaque" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        assert_eq!(gateway.session_count(), 1);
    }
}
