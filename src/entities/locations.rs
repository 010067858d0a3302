use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::worker_locations::Entity")]
    WorkerLocations,
}

impl Related<super::worker_locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkerLocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
