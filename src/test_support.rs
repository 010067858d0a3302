//! Fixtures shared by the inline service and handler tests.

use crate::entities::{
    PortfolioStatus, QrCodeStatus, TradeCategory, UserType, location_entity, portfolio_entity,
    profile_entity, qr_code_entity, review_entity, user_entity, worker_service_entity,
};
use crate::error::{AppError, AppResult};
use crate::external::{
    CheckoutRequest, CreatedCheckoutSession, Mailer, OutgoingEmail, PaymentGateway,
    QrImageRenderer,
};
use crate::utils::new_id;
use async_trait::async_trait;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::Mutex;

/// Not a real bcrypt hash. Tests that log in create the account through signup.
pub const PASSWORD_HASH: &str = "fixture-password-hash";

pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("in-memory sqlite connects");
    Migrator::up(&db, None).await.expect("migrations apply");
    db
}

pub async fn insert_user(db: &DatabaseConnection, email: &str, user_type: UserType) -> String {
    let id = new_id();
    let now = Utc::now();
    user_entity::ActiveModel {
        id: Set(id.clone()),
        email: Set(email.to_string()),
        password_hash: Set(PASSWORD_HASH.to_string()),
        app_metadata: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("user inserts");

    profile_entity::ActiveModel {
        user_id: Set(id.clone()),
        full_name: Set(email.split('@').next().unwrap_or(email).to_string()),
        user_type: Set(user_type),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("profile inserts");

    id
}

pub async fn insert_portfolio(
    db: &DatabaseConnection,
    user_id: &str,
    business_name: &str,
    location: &str,
    status: PortfolioStatus,
) -> String {
    let id = new_id();
    let now = Utc::now();
    portfolio_entity::ActiveModel {
        id: Set(id.clone()),
        user_id: Set(user_id.to_string()),
        business_name: Set(business_name.to_string()),
        email: Set(None),
        phone: Set(None),
        location: Set(Some(location.to_string())),
        description: Set(None),
        years_experience: Set(None),
        hourly_rate: Set(None),
        status: Set(status),
        is_verified: Set(false),
        is_featured: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("portfolio inserts");
    id
}

pub async fn insert_service(
    db: &DatabaseConnection,
    portfolio_id: &str,
    name: &str,
    category: TradeCategory,
) -> String {
    let id = new_id();
    worker_service_entity::ActiveModel {
        id: Set(id.clone()),
        portfolio_id: Set(portfolio_id.to_string()),
        name: Set(name.to_string()),
        description: Set(None),
        category: Set(category),
        price_from: Set(None),
        price_to: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("service inserts");
    id
}

pub async fn insert_review(
    db: &DatabaseConnection,
    portfolio_id: &str,
    customer_id: &str,
    rating: i32,
) -> String {
    let id = new_id();
    review_entity::ActiveModel {
        id: Set(id.clone()),
        portfolio_id: Set(portfolio_id.to_string()),
        customer_id: Set(customer_id.to_string()),
        rating: Set(rating),
        comment: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("review inserts");
    id
}

pub async fn insert_location(db: &DatabaseConnection, name: &str, is_active: bool) -> String {
    let id = new_id();
    location_entity::ActiveModel {
        id: Set(id.clone()),
        name: Set(name.to_string()),
        is_active: Set(is_active),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("location inserts");
    id
}

pub async fn insert_qr_code(db: &DatabaseConnection, code: &str) {
    qr_code_entity::ActiveModel {
        id: Set(code.to_string()),
        memorial_url: Set(format!("http://localhost:3000/memory/{code}")),
        status: Set(QrCodeStatus::Unclaimed),
        claimed_by: Set(None),
        claimed_at: Set(None),
        memorial_id: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("qr code inserts");
}

/// Records every call; fails customer lookups or sessions when asked to.
#[derive(Default)]
pub struct FakePaymentGateway {
    pub fail_customer: bool,
    pub fail_session: bool,
    pub customer_calls: Mutex<Vec<String>>,
    pub sessions: Mutex<Vec<CheckoutRequest>>,
}

impl FakePaymentGateway {
    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn find_or_create_customer(&self, email: &str, _user_id: &str) -> AppResult<String> {
        if let Ok(mut calls) = self.customer_calls.lock() {
            calls.push(email.to_string());
        }
        if self.fail_customer {
            return Err(AppError::ExternalApiError("customer lookup down".to_string()));
        }
        Ok("cus_test_123".to_string())
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> AppResult<CreatedCheckoutSession> {
        if self.fail_session {
            return Err(AppError::ExternalApiError("No such price".to_string()));
        }
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| AppError::InternalError("poisoned".to_string()))?;
        sessions.push(request.clone());
        Ok(CreatedCheckoutSession {
            id: format!("cs_test_{}", sessions.len()),
            url: format!("https://checkout.stripe.test/pay/cs_test_{}", sessions.len()),
        })
    }
}

#[derive(Default)]
pub struct FakeMailer {
    pub fail: bool,
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl FakeMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        if self.fail {
            return Err(AppError::ExternalApiError("SMTP relay refused".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}

pub struct FailingRenderer;

impl QrImageRenderer for FailingRenderer {
    fn render_svg(&self, _content: &str) -> AppResult<String> {
        Err(AppError::InternalError("renderer offline".to_string()))
    }
}
