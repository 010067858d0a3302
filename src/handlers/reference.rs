use crate::services::ReferenceService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/locations",
    tag = "reference",
    responses(
        (status = 200, description = "Active locations", body = [crate::models::LocationResponse])
    )
)]
pub async fn list_locations(reference_service: web::Data<ReferenceService>) -> Result<HttpResponse> {
    match reference_service.list_locations(false).await {
        Ok(locations) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": locations
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/service-categories",
    tag = "reference",
    responses(
        (status = 200, description = "Active service categories", body = [crate::models::ServiceCategoryResponse])
    )
)]
pub async fn list_service_categories(
    reference_service: web::Data<ReferenceService>,
) -> Result<HttpResponse> {
    match reference_service.list_categories(false).await {
        Ok(categories) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": categories
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn reference_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/locations", web::get().to(list_locations))
        .route("/service-categories", web::get().to(list_service_categories));
}
