use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::CartService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/cart",
    tag = "cart",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Saved cart, empty when none exists", body = CartResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_cart(cart_service: web::Data<CartService>, user: AuthUser) -> Result<HttpResponse> {
    match cart_service.load(&user.user_id).await {
        Ok(cart) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cart
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/cart",
    tag = "cart",
    security(
        ("bearer_auth" = [])
    ),
    request_body = SaveCartRequest,
    responses(
        (status = 200, description = "Cart replaced", body = CartResponse),
        (status = 400, description = "Invalid cart item")
    )
)]
pub async fn save_cart(
    cart_service: web::Data<CartService>,
    user: AuthUser,
    request: web::Json<SaveCartRequest>,
) -> Result<HttpResponse> {
    match cart_service.save(&user.user_id, request.into_inner()).await {
        Ok(cart) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cart
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cart_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/cart")
            .route(web::get().to(get_cart))
            .route(web::put().to(save_cart)),
    );
}
