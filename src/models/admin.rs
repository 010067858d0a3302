use crate::entities::{PortfolioStatus, UserType, activity_log_entity, admin_setting_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub target_user_id: Option<String>,
    #[schema(example = "tradesperson")]
    pub new_role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignRoleResponse {
    pub user_id: String,
    pub user_type: UserType,
    /// Whether the role was also copied into the identity metadata.
    pub metadata_mirrored: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePortfolioStatusRequest {
    pub status: PortfolioStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetFlagRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateSettingRequest {
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminSettingResponse {
    pub key: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<admin_setting_entity::Model> for AdminSettingResponse {
    fn from(m: admin_setting_entity::Model) -> Self {
        Self {
            key: m.key,
            value: m.value,
            updated_by: m.updated_by,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityLogResponse {
    pub id: String,
    pub admin_id: String,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<activity_log_entity::Model> for ActivityLogResponse {
    fn from(m: activity_log_entity::Model) -> Self {
        Self {
            id: m.id,
            admin_id: m.admin_id,
            action: m.action,
            target_type: m.target_type,
            target_id: m.target_id,
            details: m.details,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserTypeCounts {
    pub customer: u64,
    pub tradesperson: u64,
    pub admin: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PortfolioStatusCounts {
    pub pending: u64,
    pub active: u64,
    pub suspended: u64,
    pub inactive: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub users: UserTypeCounts,
    pub total_users: u64,
    pub portfolios: PortfolioStatusCounts,
    pub featured_portfolios: u64,
    pub verified_portfolios: u64,
    pub services: u64,
    pub reviews: u64,
    pub average_rating: f64,
    pub qr_codes_total: u64,
    pub qr_codes_claimed: u64,
    pub qr_codes_unclaimed: u64,
    pub memorials: u64,
    pub recent_activity: Vec<ActivityLogResponse>,
}
