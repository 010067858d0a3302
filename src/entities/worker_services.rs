use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fixed trade taxonomy a worker service is filed under.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema, DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TradeCategory {
    #[sea_orm(string_value = "plumbing")]
    Plumbing,
    #[sea_orm(string_value = "electrical")]
    Electrical,
    #[sea_orm(string_value = "carpentry")]
    Carpentry,
    #[sea_orm(string_value = "painting")]
    Painting,
    #[sea_orm(string_value = "roofing")]
    Roofing,
    #[sea_orm(string_value = "landscaping")]
    Landscaping,
    #[sea_orm(string_value = "cleaning")]
    Cleaning,
    #[sea_orm(string_value = "hvac")]
    Hvac,
    #[sea_orm(string_value = "handyman")]
    Handyman,
    #[sea_orm(string_value = "other")]
    Other,
}

impl TradeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeCategory::Plumbing => "plumbing",
            TradeCategory::Electrical => "electrical",
            TradeCategory::Carpentry => "carpentry",
            TradeCategory::Painting => "painting",
            TradeCategory::Roofing => "roofing",
            TradeCategory::Landscaping => "landscaping",
            TradeCategory::Cleaning => "cleaning",
            TradeCategory::Hvac => "hvac",
            TradeCategory::Handyman => "handyman",
            TradeCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for TradeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "worker_services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub portfolio_id: String,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub category: TradeCategory,
    #[sea_orm(column_type = "Double", nullable)]
    pub price_from: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub price_to: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::worker_portfolios::Entity",
        from = "Column::PortfolioId",
        to = "super::worker_portfolios::Column::Id"
    )]
    Portfolio,
}

impl Related<super::worker_portfolios::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Portfolio.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
