use crate::error::AppError;
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::QrCodeService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/qr/{code}",
    tag = "qr_codes",
    params(
        ("code" = String, Path, description = "QR code, e.g. MEM-3F9A0C21")
    ),
    responses(
        (status = 200, description = "Landing state for the scanned code", body = QrLandingResponse),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn landing(
    qr_code_service: web::Data<QrCodeService>,
    path: web::Path<String>,
    user: Option<AuthUser>,
) -> Result<HttpResponse> {
    let viewer = user.as_ref().map(|u| u.user_id.as_str());
    match qr_code_service.landing(&path, viewer).await {
        Ok(landing) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": landing
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/qr/{code}/claim",
    tag = "qr_codes",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("code" = String, Path, description = "QR code to claim")
    ),
    request_body = ClaimQrCodeRequest,
    responses(
        (status = 200, description = "Code claimed and memorial created", body = ClaimQrCodeResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown code"),
        (status = 400, description = "Code already claimed")
    )
)]
pub async fn claim(
    qr_code_service: web::Data<QrCodeService>,
    path: web::Path<String>,
    user: AuthUser,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let request = match claim_request(&body) {
        Ok(request) => request,
        Err(e) => return Ok(e.error_response()),
    };
    match qr_code_service.claim(&user.user_id, &path, request).await {
        Ok(claimed) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": claimed
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// An empty body claims with the default title; anything else must be valid JSON.
fn claim_request(body: &[u8]) -> Result<ClaimQrCodeRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ClaimQrCodeRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::ValidationError(format!("Invalid request body: {e}")))
}

pub fn qr_code_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/qr")
            .route("/{code}", web::get().to(landing))
            .route("/{code}/claim", web::post().to(claim)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::entities::{QrCodeStatus, UserType, qr_code_entity};
    use crate::external::SvgQrRenderer;
    use crate::middlewares::AuthMiddleware;
    use crate::services::ActivityLogService;
    use crate::test_support::*;
    use crate::utils::JwtService;
    use actix_web::{App, test as actix_test};
    use sea_orm::EntityTrait;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_claim_rejects_malformed_body_and_defaults_empty_one() {
        let db = setup_test_db().await;
        let owner = insert_user(&db, "owner@example.com", UserType::Customer).await;
        insert_qr_code(&db, "MEM-0000AAAA").await;
        let qr_code_service = QrCodeService::new(
            db.clone(),
            ActivityLogService::new(db.clone()),
            Arc::new(SvgQrRenderer),
            AppConfig {
                frontend_url: "https://workersmate.test".to_string(),
            },
        );
        let jwt = JwtService::new("qr-handler-secret", 60, 120);
        let token = jwt.generate_access_token(&owner, "owner@example.com").unwrap();

        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt))
                .app_data(web::Data::new(qr_code_service))
                .service(web::scope("/api/v1").configure(qr_code_config)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/qr/MEM-0000AAAA/claim")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .insert_header(("Content-Type", "application/json"))
            .set_payload(r#"{"title": "Mary"#)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let stored = qr_code_entity::Entity::find_by_id("MEM-0000AAAA".to_string())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, QrCodeStatus::Unclaimed);

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/qr/MEM-0000AAAA/claim")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["memorial"]["title"], "In Loving Memory");
    }

    #[test]
    fn test_claim_request_parsing() {
        assert!(claim_request(b"").unwrap().title.is_none());
        assert!(claim_request(b"  \n").unwrap().title.is_none());
        assert_eq!(
            claim_request(br#"{"title":"Mary"}"#).unwrap().title.as_deref(),
            Some("Mary")
        );
        assert!(matches!(
            claim_request(b"not json"),
            Err(AppError::ValidationError(_))
        ));
    }
}
