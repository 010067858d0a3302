use crate::entities::memorial_entity;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemorialResponse {
    pub id: String,
    pub owner_id: String,
    pub qr_code_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub photos: Vec<String>,
    pub profile_picture_url: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<memorial_entity::Model> for MemorialResponse {
    fn from(m: memorial_entity::Model) -> Self {
        // Rows written by this service always hold a string array
        let photos = serde_json::from_value::<Vec<String>>(m.photos).unwrap_or_default();
        Self {
            id: m.id,
            owner_id: m.owner_id,
            qr_code_id: m.qr_code_id,
            title: m.title,
            description: m.description,
            birth_date: m.birth_date,
            death_date: m.death_date,
            photos,
            profile_picture_url: m.profile_picture_url,
            is_public: m.is_public,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Partial update. An empty string clears `description` / `profile_picture_url`.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMemorialRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub profile_picture_url: Option<String>,
    pub photos: Option<Vec<String>>,
    pub is_public: Option<bool>,
}
