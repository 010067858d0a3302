use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::MemorialService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/memorials/mine",
    tag = "memorials",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Memorials owned by the caller", body = [MemorialResponse]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_mine(
    memorial_service: web::Data<MemorialService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match memorial_service.list_mine(&user.user_id).await {
        Ok(memorials) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": memorials
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/memorials/{id}",
    tag = "memorials",
    params(
        ("id" = String, Path, description = "Memorial ID")
    ),
    responses(
        (status = 200, description = "Memorial", body = MemorialResponse),
        (status = 404, description = "Memorial not found or private")
    )
)]
pub async fn get_memorial(
    memorial_service: web::Data<MemorialService>,
    path: web::Path<String>,
    user: Option<AuthUser>,
) -> Result<HttpResponse> {
    let viewer = user.as_ref().map(|u| u.user_id.as_str());
    match memorial_service.get(&path, viewer).await {
        Ok(memorial) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": memorial
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/memorials/{id}",
    tag = "memorials",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Memorial ID")
    ),
    request_body = UpdateMemorialRequest,
    responses(
        (status = 200, description = "Memorial updated", body = MemorialResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Caller does not own the memorial"),
        (status = 404, description = "Memorial not found")
    )
)]
pub async fn update_memorial(
    memorial_service: web::Data<MemorialService>,
    path: web::Path<String>,
    user: AuthUser,
    request: web::Json<UpdateMemorialRequest>,
) -> Result<HttpResponse> {
    match memorial_service
        .update(&user.user_id, &path, request.into_inner())
        .await
    {
        Ok(memorial) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": memorial
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn memorial_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/memorials")
            .route("/mine", web::get().to(list_mine))
            .route("/{id}", web::get().to(get_memorial))
            .route("/{id}", web::put().to(update_memorial)),
    );
}
