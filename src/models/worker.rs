use crate::entities::{
    PortfolioStatus, TradeCategory, portfolio_entity, review_entity, worker_service_entity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Optional predicates for the worker directory. Blank or `all` disables a predicate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WorkerFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PortfolioResponse {
    pub id: String,
    pub user_id: String,
    pub business_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub years_experience: Option<i32>,
    pub hourly_rate: Option<f64>,
    pub status: PortfolioStatus,
    pub is_verified: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<portfolio_entity::Model> for PortfolioResponse {
    fn from(m: portfolio_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            business_name: m.business_name,
            email: m.email,
            phone: m.phone,
            location: m.location,
            description: m.description,
            years_experience: m.years_experience,
            hourly_rate: m.hourly_rate,
            status: m.status,
            is_verified: m.is_verified,
            is_featured: m.is_featured,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkerServiceResponse {
    pub id: String,
    pub portfolio_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: TradeCategory,
    pub price_from: Option<f64>,
    pub price_to: Option<f64>,
}

impl From<worker_service_entity::Model> for WorkerServiceResponse {
    fn from(m: worker_service_entity::Model) -> Self {
        Self {
            id: m.id,
            portfolio_id: m.portfolio_id,
            name: m.name,
            description: m.description,
            category: m.category,
            price_from: m.price_from,
            price_to: m.price_to,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub id: String,
    pub portfolio_id: String,
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<review_entity::Model> for ReviewResponse {
    fn from(m: review_entity::Model) -> Self {
        Self {
            id: m.id,
            portfolio_id: m.portfolio_id,
            customer_id: m.customer_id,
            customer_name: None,
            rating: m.rating,
            comment: m.comment,
            created_at: m.created_at,
        }
    }
}

/// A portfolio joined with everything the directory filters on.
#[derive(Debug, Clone)]
pub struct WorkerListing {
    pub portfolio: PortfolioResponse,
    pub services: Vec<WorkerServiceResponse>,
    pub reviews: Vec<ReviewResponse>,
    pub secondary_locations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkerCard {
    #[serde(flatten)]
    pub portfolio: PortfolioResponse,
    pub categories: Vec<TradeCategory>,
    pub services: Vec<WorkerServiceResponse>,
    pub secondary_locations: Vec<String>,
    pub average_rating: f64,
    pub review_count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkerDetail {
    #[serde(flatten)]
    pub card: WorkerCard,
    pub reviews: Vec<ReviewResponse>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePortfolioRequest {
    pub business_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub years_experience: Option<i32>,
    pub hourly_rate: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    #[schema(example = "Boiler repair")]
    pub name: String,
    pub description: Option<String>,
    pub category: TradeCategory,
    pub price_from: Option<f64>,
    pub price_to: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<TradeCategory>,
    pub price_from: Option<f64>,
    pub price_to: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetLocationsRequest {
    pub location_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    #[schema(example = 5)]
    pub rating: i32,
    pub comment: Option<String>,
}
