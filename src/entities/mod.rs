pub mod admin_activity_logs;
pub mod admin_settings;
pub mod carts;
pub mod locations;
pub mod memorials;
pub mod profiles;
pub mod qr_codes;
pub mod service_categories;
pub mod users;
pub mod worker_locations;
pub mod worker_portfolios;
pub mod worker_reviews;
pub mod worker_services;

pub use admin_activity_logs as activity_log_entity;
pub use admin_settings as admin_setting_entity;
pub use carts as cart_entity;
pub use locations as location_entity;
pub use memorials as memorial_entity;
pub use profiles as profile_entity;
pub use qr_codes as qr_code_entity;
pub use service_categories as service_category_entity;
pub use users as user_entity;
pub use worker_locations as worker_location_entity;
pub use worker_portfolios as portfolio_entity;
pub use worker_reviews as review_entity;
pub use worker_services as worker_service_entity;

pub use profiles::UserType;
pub use qr_codes::QrCodeStatus;
pub use worker_portfolios::PortfolioStatus;
pub use worker_services::TradeCategory;
