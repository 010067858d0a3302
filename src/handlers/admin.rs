use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::{ActivityLogService, AdminService, QrCodeService, ReferenceService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// Short-circuits with 403 for callers without the admin role.
macro_rules! ensure_admin {
    ($admin_service:expr, $user:expr) => {
        if let Err(e) = $admin_service.require_admin(&$user.user_id).await {
            return Ok(e.error_response());
        }
    };
}

#[utoipa::path(
    post,
    path = "/admin/users/role",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Role assigned", body = AssignRoleResponse),
        (status = 400, description = "Missing or unknown role"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Target user not found")
    )
)]
pub async fn assign_user_role(
    admin_service: web::Data<AdminService>,
    user: AuthUser,
    request: web::Json<AssignRoleRequest>,
) -> Result<HttpResponse> {
    match admin_service
        .assign_role(&user.user_id, request.into_inner())
        .await
    {
        Ok(assigned) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": assigned
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateAdminUserRequest,
    responses(
        (status = 200, description = "Admin account created", body = ProfileResponse),
        (status = 400, description = "Missing fields or duplicate email"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn create_admin_user(
    admin_service: web::Data<AdminService>,
    user: AuthUser,
    request: web::Json<CreateAdminUserRequest>,
) -> Result<HttpResponse> {
    match admin_service
        .create_admin_user(&user.user_id, request.into_inner())
        .await
    {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated profiles"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_users(
    admin_service: web::Data<AdminService>,
    user: AuthUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match admin_service.list_users(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Aggregated platform counts", body = DashboardStats),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn dashboard(admin_service: web::Data<AdminService>, user: AuthUser) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match admin_service.dashboard().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/workers",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(PaginationParams),
    responses(
        (status = 200, description = "Portfolios in every status"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_portfolios(
    admin_service: web::Data<AdminService>,
    user: AuthUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match admin_service.list_portfolios(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/workers/{id}/status",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Portfolio ID")
    ),
    request_body = UpdatePortfolioStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = PortfolioResponse),
        (status = 404, description = "Portfolio not found")
    )
)]
pub async fn set_portfolio_status(
    admin_service: web::Data<AdminService>,
    path: web::Path<String>,
    user: AuthUser,
    request: web::Json<UpdatePortfolioStatusRequest>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match admin_service
        .set_portfolio_status(&user.user_id, &path, request.status)
        .await
    {
        Ok(portfolio) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": portfolio
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/workers/{id}/featured",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Portfolio ID")
    ),
    request_body = SetFlagRequest,
    responses(
        (status = 200, description = "Featured flag changed", body = PortfolioResponse),
        (status = 404, description = "Portfolio not found")
    )
)]
pub async fn set_portfolio_featured(
    admin_service: web::Data<AdminService>,
    path: web::Path<String>,
    user: AuthUser,
    request: web::Json<SetFlagRequest>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match admin_service
        .set_portfolio_featured(&user.user_id, &path, request.enabled)
        .await
    {
        Ok(portfolio) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": portfolio
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/workers/{id}/verified",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Portfolio ID")
    ),
    request_body = SetFlagRequest,
    responses(
        (status = 200, description = "Verified flag changed", body = PortfolioResponse),
        (status = 404, description = "Portfolio not found")
    )
)]
pub async fn set_portfolio_verified(
    admin_service: web::Data<AdminService>,
    path: web::Path<String>,
    user: AuthUser,
    request: web::Json<SetFlagRequest>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match admin_service
        .set_portfolio_verified(&user.user_id, &path, request.enabled)
        .await
    {
        Ok(portfolio) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": portfolio
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/workers/{id}",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Portfolio ID")
    ),
    responses(
        (status = 200, description = "Portfolio and its services, reviews and locations deleted"),
        (status = 404, description = "Portfolio not found")
    )
)]
pub async fn delete_portfolio(
    admin_service: web::Data<AdminService>,
    path: web::Path<String>,
    user: AuthUser,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match admin_service.delete_portfolio(&user.user_id, &path).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Portfolio deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/reviews/{id}",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn delete_review(
    admin_service: web::Data<AdminService>,
    path: web::Path<String>,
    user: AuthUser,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match admin_service.delete_review(&user.user_id, &path).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Review deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/locations",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All locations, active or not", body = [LocationResponse])
    )
)]
pub async fn list_locations(
    admin_service: web::Data<AdminService>,
    reference_service: web::Data<ReferenceService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match reference_service.list_locations(true).await {
        Ok(locations) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": locations
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/locations",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateLocationRequest,
    responses(
        (status = 200, description = "Location created", body = LocationResponse),
        (status = 400, description = "Invalid or duplicate name")
    )
)]
pub async fn create_location(
    admin_service: web::Data<AdminService>,
    reference_service: web::Data<ReferenceService>,
    user: AuthUser,
    request: web::Json<CreateLocationRequest>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match reference_service
        .create_location(&user.user_id, request.into_inner())
        .await
    {
        Ok(location) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": location
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/locations/{id}",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Location ID")
    ),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Location updated", body = LocationResponse),
        (status = 404, description = "Location not found")
    )
)]
pub async fn update_location(
    admin_service: web::Data<AdminService>,
    reference_service: web::Data<ReferenceService>,
    path: web::Path<String>,
    user: AuthUser,
    request: web::Json<UpdateLocationRequest>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match reference_service
        .update_location(&user.user_id, &path, request.into_inner())
        .await
    {
        Ok(location) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": location
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/locations/{id}",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Location deleted"),
        (status = 404, description = "Location not found")
    )
)]
pub async fn delete_location(
    admin_service: web::Data<AdminService>,
    reference_service: web::Data<ReferenceService>,
    path: web::Path<String>,
    user: AuthUser,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match reference_service
        .delete_location(&user.user_id, &path)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Location deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/service-categories",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All service categories", body = [ServiceCategoryResponse])
    )
)]
pub async fn list_categories(
    admin_service: web::Data<AdminService>,
    reference_service: web::Data<ReferenceService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match reference_service.list_categories(true).await {
        Ok(categories) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": categories
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/service-categories",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateServiceCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = ServiceCategoryResponse),
        (status = 400, description = "Invalid or duplicate name")
    )
)]
pub async fn create_category(
    admin_service: web::Data<AdminService>,
    reference_service: web::Data<ReferenceService>,
    user: AuthUser,
    request: web::Json<CreateServiceCategoryRequest>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match reference_service
        .create_category(&user.user_id, request.into_inner())
        .await
    {
        Ok(category) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": category
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/service-categories/{id}",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    request_body = UpdateServiceCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ServiceCategoryResponse),
        (status = 404, description = "Category not found")
    )
)]
pub async fn update_category(
    admin_service: web::Data<AdminService>,
    reference_service: web::Data<ReferenceService>,
    path: web::Path<String>,
    user: AuthUser,
    request: web::Json<UpdateServiceCategoryRequest>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match reference_service
        .update_category(&user.user_id, &path, request.into_inner())
        .await
    {
        Ok(category) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": category
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/service-categories/{id}",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    admin_service: web::Data<AdminService>,
    reference_service: web::Data<ReferenceService>,
    path: web::Path<String>,
    user: AuthUser,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match reference_service
        .delete_category(&user.user_id, &path)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Service category deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/settings",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All settings", body = [AdminSettingResponse])
    )
)]
pub async fn list_settings(
    admin_service: web::Data<AdminService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match admin_service.list_settings().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": settings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/settings/{key}",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("key" = String, Path, description = "Setting key")
    ),
    request_body = UpdateSettingRequest,
    responses(
        (status = 200, description = "Setting stored", body = AdminSettingResponse),
        (status = 400, description = "Invalid key")
    )
)]
pub async fn update_setting(
    admin_service: web::Data<AdminService>,
    path: web::Path<String>,
    user: AuthUser,
    request: web::Json<UpdateSettingRequest>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match admin_service
        .update_setting(&user.user_id, &path, request.into_inner().value)
        .await
    {
        Ok(setting) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": setting
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/activity-logs",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(PaginationParams),
    responses(
        (status = 200, description = "Activity log, newest first")
    )
)]
pub async fn list_activity_logs(
    admin_service: web::Data<AdminService>,
    activity_log_service: web::Data<ActivityLogService>,
    user: AuthUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match activity_log_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/qr-codes/generate",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = GenerateQrCodesRequest,
    responses(
        (status = 200, description = "Codes generated", body = GenerateQrCodesResponse),
        (status = 400, description = "Invalid count or prefix")
    )
)]
pub async fn generate_qr_codes(
    admin_service: web::Data<AdminService>,
    qr_code_service: web::Data<QrCodeService>,
    user: AuthUser,
    request: web::Json<GenerateQrCodesRequest>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match qr_code_service
        .generate(&user.user_id, request.into_inner())
        .await
    {
        Ok(generated) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": generated
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/qr-codes/export",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = ExportQrCodesRequest,
    responses(
        (status = 200, description = "Printable SVG files and bundle", body = ExportQrCodesResponse),
        (status = 400, description = "Empty code list")
    )
)]
pub async fn export_qr_codes(
    admin_service: web::Data<AdminService>,
    qr_code_service: web::Data<QrCodeService>,
    user: AuthUser,
    request: web::Json<ExportQrCodesRequest>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match qr_code_service
        .export(&user.user_id, request.into_inner())
        .await
    {
        Ok(exported) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": exported
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/qr-codes",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(QrCodeQuery),
    responses(
        (status = 200, description = "Paginated QR codes")
    )
)]
pub async fn list_qr_codes(
    admin_service: web::Data<AdminService>,
    qr_code_service: web::Data<QrCodeService>,
    user: AuthUser,
    query: web::Query<QrCodeQuery>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match qr_code_service.list(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/qr-codes/{code}",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("code" = String, Path, description = "QR code")
    ),
    responses(
        (status = 200, description = "Code deleted"),
        (status = 400, description = "Code already claimed"),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn delete_qr_code(
    admin_service: web::Data<AdminService>,
    qr_code_service: web::Data<QrCodeService>,
    path: web::Path<String>,
    user: AuthUser,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match qr_code_service.delete(&user.user_id, &path).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "QR code deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/memorials",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated memorials")
    )
)]
pub async fn list_memorials(
    admin_service: web::Data<AdminService>,
    user: AuthUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    ensure_admin!(admin_service, user);
    match admin_service.list_memorials(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/dashboard", web::get().to(dashboard))
            .route("/users", web::get().to(list_users))
            .route("/users", web::post().to(create_admin_user))
            .route("/users/role", web::post().to(assign_user_role))
            .route("/workers", web::get().to(list_portfolios))
            .route("/workers/{id}", web::delete().to(delete_portfolio))
            .route("/workers/{id}/status", web::put().to(set_portfolio_status))
            .route("/workers/{id}/featured", web::put().to(set_portfolio_featured))
            .route("/workers/{id}/verified", web::put().to(set_portfolio_verified))
            .route("/reviews/{id}", web::delete().to(delete_review))
            .route("/locations", web::get().to(list_locations))
            .route("/locations", web::post().to(create_location))
            .route("/locations/{id}", web::put().to(update_location))
            .route("/locations/{id}", web::delete().to(delete_location))
            .route("/service-categories", web::get().to(list_categories))
            .route("/service-categories", web::post().to(create_category))
            .route("/service-categories/{id}", web::put().to(update_category))
            .route("/service-categories/{id}", web::delete().to(delete_category))
            .route("/settings", web::get().to(list_settings))
            .route("/settings/{key}", web::put().to(update_setting))
            .route("/activity-logs", web::get().to(list_activity_logs))
            .route("/qr-codes", web::get().to(list_qr_codes))
            .route("/qr-codes/generate", web::post().to(generate_qr_codes))
            .route("/qr-codes/export", web::post().to(export_qr_codes))
            .route("/qr-codes/{code}", web::delete().to(delete_qr_code))
            .route("/memorials", web::get().to(list_memorials)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserType;
    use crate::middlewares::AuthMiddleware;
    use crate::test_support::*;
    use crate::utils::JwtService;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn test_dashboard_rejects_non_admin() {
        let db = setup_test_db().await;
        let customer = insert_user(&db, "customer@example.com", UserType::Customer).await;
        let admin = insert_user(&db, "admin@example.com", UserType::Admin).await;
        let admin_service = AdminService::new(db.clone(), ActivityLogService::new(db));
        let jwt = JwtService::new("admin-handler-secret", 60, 120);
        let customer_token = jwt
            .generate_access_token(&customer, "customer@example.com")
            .unwrap();
        let admin_token = jwt.generate_access_token(&admin, "admin@example.com").unwrap();

        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt))
                .app_data(web::Data::new(admin_service))
                .service(web::scope("/api/v1").configure(admin_config)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/dashboard")
            .to_request();
        let err = test::try_call_service(&app, req).await.err().unwrap();
        assert_eq!(err.as_response_error().status_code(), 401);

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/dashboard")
            .insert_header(("Authorization", format!("Bearer {customer_token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/dashboard")
            .insert_header(("Authorization", format!("Bearer {admin_token}")))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["total_users"], 2);
    }
}
