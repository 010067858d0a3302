use crate::models::*;
use crate::services::ContactService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/contact",
    tag = "contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Both emails sent", body = ContactResponse),
        (status = 400, description = "Missing fields or malformed email"),
        (status = 502, description = "Mail server error")
    )
)]
pub async fn send_contact_email(
    contact_service: web::Data<ContactService>,
    request: web::Json<ContactRequest>,
) -> Result<HttpResponse> {
    match contact_service.send(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "message": "Your message has been sent"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn contact_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/contact", web::post().to(send_contact_email));
}
