use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `Unclaimed` moves to `Claimed` once and never back.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum QrCodeStatus {
    #[sea_orm(string_value = "unclaimed")]
    Unclaimed,
    #[sea_orm(string_value = "claimed")]
    Claimed,
}

impl std::fmt::Display for QrCodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QrCodeStatus::Unclaimed => write!(f, "unclaimed"),
            QrCodeStatus::Claimed => write!(f, "claimed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "qr_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub memorial_url: String,
    pub status: QrCodeStatus,
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub memorial_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::memorials::Entity",
        from = "Column::MemorialId",
        to = "super::memorials::Column::Id"
    )]
    Memorial,
}

impl Related<super::memorials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memorial.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
