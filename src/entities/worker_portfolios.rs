use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema, DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PortfolioStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "suspended")]
    Suspended,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl std::fmt::Display for PortfolioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortfolioStatus::Pending => write!(f, "pending"),
            PortfolioStatus::Active => write!(f, "active"),
            PortfolioStatus::Suspended => write!(f, "suspended"),
            PortfolioStatus::Inactive => write!(f, "inactive"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "worker_portfolios")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub business_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub years_experience: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub hourly_rate: Option<f64>,
    pub status: PortfolioStatus,
    pub is_verified: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::worker_services::Entity")]
    Services,
    #[sea_orm(has_many = "super::worker_reviews::Entity")]
    Reviews,
    #[sea_orm(has_many = "super::worker_locations::Entity")]
    WorkerLocations,
}

impl Related<super::worker_services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Services.def()
    }
}

impl Related<super::worker_reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::worker_locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkerLocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
