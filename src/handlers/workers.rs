use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::PortfolioService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/workers",
    tag = "workers",
    params(WorkerFilter),
    responses(
        (status = 200, description = "Active workers matching the filter", body = [WorkerCard])
    )
)]
pub async fn list_workers(
    portfolio_service: web::Data<PortfolioService>,
    query: web::Query<WorkerFilter>,
) -> Result<HttpResponse> {
    match portfolio_service.list_workers(&query).await {
        Ok(workers) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": workers
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/workers/featured",
    tag = "workers",
    responses(
        (status = 200, description = "Featured active workers", body = [WorkerCard])
    )
)]
pub async fn list_featured(portfolio_service: web::Data<PortfolioService>) -> Result<HttpResponse> {
    match portfolio_service.list_featured().await {
        Ok(workers) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": workers
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/workers/{id}",
    tag = "workers",
    params(
        ("id" = String, Path, description = "Portfolio ID")
    ),
    responses(
        (status = 200, description = "Worker detail", body = WorkerDetail),
        (status = 404, description = "Worker not found")
    )
)]
pub async fn get_worker(
    portfolio_service: web::Data<PortfolioService>,
    path: web::Path<String>,
    user: Option<AuthUser>,
) -> Result<HttpResponse> {
    let viewer = user.as_ref().map(|u| u.user_id.as_str());
    match portfolio_service.get_worker(&path, viewer).await {
        Ok(worker) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": worker
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/workers/{id}/reviews",
    tag = "workers",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Portfolio ID")
    ),
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid rating or duplicate review"),
        (status = 403, description = "Only customers can review"),
        (status = 404, description = "Worker not found")
    )
)]
pub async fn create_review(
    portfolio_service: web::Data<PortfolioService>,
    path: web::Path<String>,
    user: AuthUser,
    request: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse> {
    match portfolio_service
        .add_review(&user.user_id, &path, request.into_inner())
        .await
    {
        Ok(review) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": review
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/workers/me",
    tag = "workers",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Own portfolio", body = WorkerDetail),
        (status = 403, description = "Caller is not a tradesperson")
    )
)]
pub async fn get_own_portfolio(
    portfolio_service: web::Data<PortfolioService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match portfolio_service.get_own(&user.user_id).await {
        Ok(worker) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": worker
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/workers/me",
    tag = "workers",
    security(
        ("bearer_auth" = [])
    ),
    request_body = UpdatePortfolioRequest,
    responses(
        (status = 200, description = "Portfolio updated", body = WorkerDetail),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Caller is not a tradesperson")
    )
)]
pub async fn update_own_portfolio(
    portfolio_service: web::Data<PortfolioService>,
    user: AuthUser,
    request: web::Json<UpdatePortfolioRequest>,
) -> Result<HttpResponse> {
    match portfolio_service
        .update_own(&user.user_id, request.into_inner())
        .await
    {
        Ok(worker) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": worker
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/workers/me/services",
    tag = "workers",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateServiceRequest,
    responses(
        (status = 200, description = "Service created", body = WorkerServiceResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_service(
    portfolio_service: web::Data<PortfolioService>,
    user: AuthUser,
    request: web::Json<CreateServiceRequest>,
) -> Result<HttpResponse> {
    match portfolio_service
        .create_service(&user.user_id, request.into_inner())
        .await
    {
        Ok(service) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": service
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/workers/me/services/{id}",
    tag = "workers",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Service ID")
    ),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = WorkerServiceResponse),
        (status = 403, description = "Caller is not a tradesperson"),
        (status = 404, description = "Service not found in the caller's portfolio")
    )
)]
pub async fn update_service(
    portfolio_service: web::Data<PortfolioService>,
    path: web::Path<String>,
    user: AuthUser,
    request: web::Json<UpdateServiceRequest>,
) -> Result<HttpResponse> {
    match portfolio_service
        .update_service(&user.user_id, &path, request.into_inner())
        .await
    {
        Ok(service) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": service
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/workers/me/services/{id}",
    tag = "workers",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Service deleted"),
        (status = 403, description = "Caller is not a tradesperson"),
        (status = 404, description = "Service not found in the caller's portfolio")
    )
)]
pub async fn delete_service(
    portfolio_service: web::Data<PortfolioService>,
    path: web::Path<String>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match portfolio_service.delete_service(&user.user_id, &path).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Service deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/workers/me/locations",
    tag = "workers",
    security(
        ("bearer_auth" = [])
    ),
    request_body = SetLocationsRequest,
    responses(
        (status = 200, description = "Secondary locations replaced", body = [LocationResponse]),
        (status = 400, description = "Unknown or inactive location")
    )
)]
pub async fn set_locations(
    portfolio_service: web::Data<PortfolioService>,
    user: AuthUser,
    request: web::Json<SetLocationsRequest>,
) -> Result<HttpResponse> {
    match portfolio_service
        .set_locations(&user.user_id, request.into_inner())
        .await
    {
        Ok(locations) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": locations
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn worker_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/workers")
            .route("", web::get().to(list_workers))
            .route("/featured", web::get().to(list_featured))
            .route("/me", web::get().to(get_own_portfolio))
            .route("/me", web::put().to(update_own_portfolio))
            .route("/me/services", web::post().to(create_service))
            .route("/me/services/{id}", web::put().to(update_service))
            .route("/me/services/{id}", web::delete().to(delete_service))
            .route("/me/locations", web::put().to(set_locations))
            .route("/{id}", web::get().to(get_worker))
            .route("/{id}/reviews", web::post().to(create_review)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PortfolioStatus, UserType};
    use crate::test_support::*;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn test_list_workers_filters_by_query() {
        let db = setup_test_db().await;
        let ace = insert_user(&db, "ace@example.com", UserType::Tradesperson).await;
        let bright = insert_user(&db, "bright@example.com", UserType::Tradesperson).await;
        insert_portfolio(&db, &ace, "Ace Plumbing", "Dublin", PortfolioStatus::Active).await;
        insert_portfolio(&db, &bright, "Bright Electric", "Cork", PortfolioStatus::Active).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(PortfolioService::new(db)))
                .configure(worker_config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/workers?location=cork")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["business_name"], "Bright Electric");
    }

    #[actix_web::test]
    async fn test_own_portfolio_requires_identity() {
        let db = setup_test_db().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(PortfolioService::new(db)))
                .configure(worker_config),
        )
        .await;

        let req = test::TestRequest::get().uri("/workers/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}
