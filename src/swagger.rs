use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{PortfolioStatus, QrCodeStatus, TradeCategory, UserType};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::workers::list_workers,
        handlers::workers::list_featured,
        handlers::workers::get_worker,
        handlers::workers::create_review,
        handlers::workers::get_own_portfolio,
        handlers::workers::update_own_portfolio,
        handlers::workers::create_service,
        handlers::workers::update_service,
        handlers::workers::delete_service,
        handlers::workers::set_locations,
        handlers::reference::list_locations,
        handlers::reference::list_service_categories,
        handlers::qr_code::landing,
        handlers::qr_code::claim,
        handlers::memorial::list_mine,
        handlers::memorial::get_memorial,
        handlers::memorial::update_memorial,
        handlers::payment::create_checkout,
        handlers::contact::send_contact_email,
        handlers::cart::get_cart,
        handlers::cart::save_cart,
        handlers::admin::assign_user_role,
        handlers::admin::create_admin_user,
        handlers::admin::list_users,
        handlers::admin::dashboard,
        handlers::admin::list_portfolios,
        handlers::admin::set_portfolio_status,
        handlers::admin::set_portfolio_featured,
        handlers::admin::set_portfolio_verified,
        handlers::admin::delete_portfolio,
        handlers::admin::delete_review,
        handlers::admin::list_locations,
        handlers::admin::create_location,
        handlers::admin::update_location,
        handlers::admin::delete_location,
        handlers::admin::list_categories,
        handlers::admin::create_category,
        handlers::admin::update_category,
        handlers::admin::delete_category,
        handlers::admin::list_settings,
        handlers::admin::update_setting,
        handlers::admin::list_activity_logs,
        handlers::admin::generate_qr_codes,
        handlers::admin::export_qr_codes,
        handlers::admin::list_qr_codes,
        handlers::admin::delete_qr_code,
        handlers::admin::list_memorials,
    ),
    components(
        schemas(
            UserType,
            PortfolioStatus,
            TradeCategory,
            QrCodeStatus,
            SignupRequest,
            LoginRequest,
            RefreshTokenRequest,
            ProfileResponse,
            AuthResponse,
            RefreshTokenResponse,
            WorkerFilter,
            PortfolioResponse,
            WorkerServiceResponse,
            ReviewResponse,
            WorkerCard,
            WorkerDetail,
            UpdatePortfolioRequest,
            CreateServiceRequest,
            UpdateServiceRequest,
            SetLocationsRequest,
            CreateReviewRequest,
            LocationResponse,
            ServiceCategoryResponse,
            CreateLocationRequest,
            UpdateLocationRequest,
            CreateServiceCategoryRequest,
            UpdateServiceCategoryRequest,
            GenerateQrCodesRequest,
            QrCodeResponse,
            GeneratedQrCode,
            GenerateQrCodesResponse,
            ExportQrCodeItem,
            ExportQrCodesRequest,
            ExportedFile,
            ExportQrCodesResponse,
            ClaimQrCodeRequest,
            ClaimQrCodeResponse,
            QrLandingResponse,
            MemorialResponse,
            UpdateMemorialRequest,
            CreateCheckoutRequest,
            CheckoutSessionResponse,
            ContactRequest,
            ContactResponse,
            CartItem,
            SaveCartRequest,
            CartResponse,
            AssignRoleRequest,
            AssignRoleResponse,
            CreateAdminUserRequest,
            UpdatePortfolioStatusRequest,
            SetFlagRequest,
            UpdateSettingRequest,
            AdminSettingResponse,
            ActivityLogResponse,
            UserTypeCounts,
            PortfolioStatusCounts,
            DashboardStats,
            PaginationParams,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Account and token API"),
        (name = "workers", description = "Worker directory and self-service portfolio API"),
        (name = "reference", description = "Locations and service categories"),
        (name = "qr_codes", description = "Memorial QR landing and claim API"),
        (name = "memorials", description = "Memorial page API"),
        (name = "payments", description = "Plaque shop checkout API"),
        (name = "contact", description = "Contact form API"),
        (name = "cart", description = "Saved cart API"),
        (name = "admin", description = "Administration API"),
    ),
    info(
        title = "WorkersMate Backend API",
        version = "1.0.0",
        description = "WorkersMate marketplace and memorial QR REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
