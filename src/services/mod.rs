pub mod activity_log_service;
pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod contact_service;
pub mod memorial_service;
pub mod payment_service;
pub mod portfolio_service;
pub mod qr_code_service;
pub mod reference_service;
pub mod worker_search;

pub use activity_log_service::*;
pub use admin_service::*;
pub use auth_service::AuthService;
pub use cart_service::*;
pub use contact_service::*;
pub use memorial_service::*;
pub use payment_service::*;
pub use portfolio_service::*;
pub use qr_code_service::*;
pub use reference_service::*;
