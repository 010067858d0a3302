use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::str::FromStr;
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCustomer, Customer, CustomerId, ListCustomers,
};

/// Everything needed to open a hosted checkout page for one product.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub product_id: String,
    pub price_id: String,
    pub product_name: String,
    pub quantity: u64,
    pub customer_id: Option<String>,
    pub customer_email: Option<String>,
    pub user_id: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedCheckoutSession {
    pub id: String,
    pub url: String,
}

/// Payment processor seam; production uses Stripe, tests use an in-memory fake.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Returns the processor customer id for this email, creating the customer if needed.
    async fn find_or_create_customer(&self, email: &str, user_id: &str) -> AppResult<String>;

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> AppResult<CreatedCheckoutSession>;
}

#[derive(Clone)]
pub struct StripeService {
    client: Client,
}

impl StripeService {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(config.secret_key),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeService {
    async fn find_or_create_customer(&self, email: &str, user_id: &str) -> AppResult<String> {
        let mut params = ListCustomers::new();
        params.email = Some(email);
        params.limit = Some(1);
        let existing = Customer::list(&self.client, &params).await?;
        if let Some(customer) = existing.data.into_iter().next() {
            return Ok(customer.id.to_string());
        }

        let mut metadata = HashMap::new();
        metadata.insert("user_id".to_string(), user_id.to_string());
        let mut params = CreateCustomer::new();
        params.email = Some(email);
        params.metadata = Some(metadata);
        let customer = Customer::create(&self.client, params).await?;
        log::info!("Created Stripe customer {} for user {user_id}", customer.id);
        Ok(customer.id.to_string())
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> AppResult<CreatedCheckoutSession> {
        let mut metadata = HashMap::new();
        metadata.insert("product_id".to_string(), request.product_id.clone());
        metadata.insert("product_name".to_string(), request.product_name.clone());
        if let Some(user_id) = &request.user_id {
            metadata.insert("user_id".to_string(), user_id.clone());
        }

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.success_url = Some(request.success_url.as_str());
        params.cancel_url = Some(request.cancel_url.as_str());
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price: Some(request.price_id.clone()),
            quantity: Some(request.quantity),
            ..Default::default()
        }]);
        params.metadata = Some(metadata);
        params.client_reference_id = request.user_id.as_deref();

        match request.customer_id.as_deref().map(CustomerId::from_str) {
            Some(Ok(customer)) => params.customer = Some(customer),
            Some(Err(e)) => {
                log::warn!("Ignoring malformed Stripe customer id: {e}");
                params.customer_email = request.customer_email.as_deref();
            }
            None => params.customer_email = request.customer_email.as_deref(),
        }

        let session = CheckoutSession::create(&self.client, params).await?;
        let url = session.url.ok_or_else(|| {
            AppError::ExternalApiError("Stripe returned a checkout session without a URL".into())
        })?;

        Ok(CreatedCheckoutSession {
            id: session.id.to_string(),
            url,
        })
    }
}
