use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use crate::models::ErrorResponse;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Stripe error: {0}")]
    StripeError(#[from] stripe::StripeError),
}

impl AppError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalApiError(_) | AppError::StripeError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Storage and internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::ExternalApiError(msg) => msg.clone(),
            AppError::StripeError(err) => err.to_string(),
            AppError::JwtError(_) => "Invalid token".to_string(),
            AppError::DatabaseError(_) => "Database error".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::ValidationError(msg) => log::warn!("Validation error: {msg}"),
            AppError::AuthError(msg) => log::warn!("Authentication error: {msg}"),
            AppError::Forbidden(msg) => log::warn!("Forbidden access: {msg}"),
            AppError::NotFound(_) => {}
            AppError::ExternalApiError(msg) => log::error!("External API error: {msg}"),
            AppError::StripeError(err) => log::error!("Stripe error: {err}"),
            AppError::DatabaseError(err) => log::error!("Database error: {err}"),
            AppError::JwtError(err) => log::warn!("JWT error: {err}"),
            _ => log::error!("Internal error: {self}"),
        }

        HttpResponse::build(self.http_status()).json(ErrorResponse {
            success: false,
            error: self.public_message(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_validation_error_is_bad_request_with_message() {
        let err = AppError::ValidationError("Missing required fields".to_string());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Missing required fields");
    }

    #[actix_web::test]
    async fn test_database_error_hides_details() {
        let err = AppError::DatabaseError(sea_orm::DbErr::Custom("secret table".into()));
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Database error");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Forbidden("nope".into()).http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::ExternalApiError("smtp down".into()).http_status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::NotFound("x".into()).http_status(),
            StatusCode::NOT_FOUND
        );
    }
}
