pub mod admin;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod memorial;
pub mod payment;
pub mod qr_code;
pub mod reference;
pub mod workers;

pub use admin::admin_config;
pub use auth::auth_config;
pub use cart::cart_config;
pub use contact::contact_config;
pub use memorial::memorial_config;
pub use payment::payment_config;
pub use qr_code::qr_code_config;
pub use reference::reference_config;
pub use workers::worker_config;

use crate::error::AppError;
use actix_web::{error, web};

/// Malformed bodies and query strings answer with the same JSON envelope as service errors.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| error::Error::from(AppError::ValidationError(err.to_string()))),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| error::Error::from(AppError::ValidationError(err.to_string()))),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| error::Error::from(AppError::ValidationError(err.to_string()))),
    );
}
