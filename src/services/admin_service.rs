use crate::entities::{
    PortfolioStatus, QrCodeStatus, UserType, admin_setting_entity as settings,
    memorial_entity as memorials, portfolio_entity as portfolios, profile_entity as profiles,
    qr_code_entity as qr_codes, review_entity as reviews, user_entity as users,
    worker_location_entity as worker_locations, worker_service_entity as services,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::ActivityLogService;
use crate::services::auth_service::{
    ensure_email_available, find_user_type, insert_identity, load_profile,
};
use crate::utils::*;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use std::collections::HashMap;

const RECENT_ACTIVITY_LIMIT: u64 = 10;

#[derive(Clone)]
pub struct AdminService {
    pool: DatabaseConnection,
    activity_log: ActivityLogService,
}

#[derive(Debug, FromQueryResult)]
struct GroupCountRow {
    grouping: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct RatingTotalsRow {
    total: Option<i64>,
    count: i64,
}

fn validate_setting_key(key: &str) -> AppResult<()> {
    let valid = !key.is_empty()
        && key.len() <= 100
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'));
    if !valid {
        return Err(AppError::ValidationError(
            "Setting keys use lower case letters, digits, '_', '.' or '-'".to_string(),
        ));
    }
    Ok(())
}

impl AdminService {
    pub fn new(pool: DatabaseConnection, activity_log: ActivityLogService) -> Self {
        Self { pool, activity_log }
    }

    /// Fails with 403 unless the caller's profile carries the admin role.
    pub async fn require_admin(&self, user_id: &str) -> AppResult<()> {
        match find_user_type(&self.pool, user_id).await? {
            Some(UserType::Admin) => Ok(()),
            _ => Err(AppError::Forbidden("Admin access required".to_string())),
        }
    }

    /// Changes the target's role. The copy in the identity metadata is best effort.
    pub async fn assign_role(
        &self,
        caller_id: &str,
        request: AssignRoleRequest,
    ) -> AppResult<AssignRoleResponse> {
        self.require_admin(caller_id).await?;

        let target_user_id = require_field(request.target_user_id.as_deref(), "targetUserId")?;
        let new_role: UserType = require_field(request.new_role.as_deref(), "newRole")?
            .parse()
            .map_err(AppError::ValidationError)?;

        let mut profile = profiles::Entity::find_by_id(target_user_id.clone())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Target user not found".to_string()))?
            .into_active_model();
        profile.user_type = Set(new_role);
        profile.updated_at = Set(Utc::now());
        if let Err(e) = profile.update(&self.pool).await {
            log::error!("Role update for user {} failed: {}", target_user_id, e);
            return Err(AppError::ValidationError(
                "Failed to update user role".to_string(),
            ));
        }

        let mirrored = NonFatal::tolerate(
            "role metadata mirror",
            self.mirror_role(&target_user_id, new_role).await,
        );

        let _ = self
            .activity_log
            .record(
                caller_id,
                "assign_user_role",
                "user",
                Some(&target_user_id),
                Some(json!({ "new_role": new_role.to_string() })),
            )
            .await;

        log::info!("User {} now has role {}", target_user_id, new_role);
        Ok(AssignRoleResponse {
            user_id: target_user_id,
            user_type: new_role,
            metadata_mirrored: mirrored.is_applied(),
        })
    }

    /// Creates an admin identity and profile atomically. While no admin exists any
    /// signed-in user may bootstrap the first one.
    pub async fn create_admin_user(
        &self,
        caller_id: &str,
        request: CreateAdminUserRequest,
    ) -> AppResult<ProfileResponse> {
        let admin_exists = profiles::Entity::find()
            .filter(profiles::Column::UserType.eq(UserType::Admin))
            .count(&self.pool)
            .await?
            > 0;
        if admin_exists {
            self.require_admin(caller_id).await?;
        }

        let email = normalize_email(&require_field(request.email.as_deref(), "email")?);
        let password = require_field(request.password.as_deref(), "password")?;
        let full_name = require_field(request.full_name.as_deref(), "fullName")?;
        validate_email(&email)?;
        validate_password(&password)?;
        validate_length(&full_name, "fullName", 2, 100)?;

        ensure_email_available(&self.pool, &email).await?;
        let password_hash = hash_password(&password)?;

        let txn = self.pool.begin().await?;
        let user =
            match insert_identity(&txn, &email, password_hash, &full_name, UserType::Admin).await {
                Ok(user) => user,
                Err(e) => {
                    log::error!("Admin user insert for {} failed: {}", email, e);
                    txn.rollback().await?;
                    return Err(AppError::ValidationError(
                        "Failed to create admin user".to_string(),
                    ));
                }
            };
        txn.commit().await?;

        let _ = self
            .activity_log
            .record(
                caller_id,
                "create_admin_user",
                "user",
                Some(&user.id),
                Some(json!({ "email": email })),
            )
            .await;

        load_profile(&self.pool, &user).await
    }

    pub async fn list_users(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<ProfileResponse>> {
        let total = profiles::Entity::find().count(&self.pool).await?;
        let rows = profiles::Entity::find()
            .find_also_related(users::Entity)
            .order_by_desc(profiles::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;

        let user_ids: Vec<String> = rows.iter().map(|(p, _)| p.user_id.clone()).collect();
        let portfolio_ids: HashMap<String, String> = portfolios::Entity::find()
            .filter(portfolios::Column::UserId.is_in(user_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p.id))
            .collect();

        let items = rows
            .into_iter()
            .map(|(profile, user)| ProfileResponse {
                email: user.map(|u| u.email).unwrap_or_default(),
                portfolio_id: portfolio_ids.get(&profile.user_id).cloned(),
                user_id: profile.user_id,
                full_name: profile.full_name,
                user_type: profile.user_type,
                created_at: profile.created_at,
            })
            .collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let mut user_counts = UserTypeCounts::default();
        for row in profiles::Entity::find()
            .select_only()
            .column_as(profiles::Column::UserType, "grouping")
            .column_as(Expr::col(profiles::Column::UserId).count(), "count")
            .group_by(profiles::Column::UserType)
            .into_model::<GroupCountRow>()
            .all(&self.pool)
            .await?
        {
            let count = row.count.max(0) as u64;
            match row.grouping.parse::<UserType>() {
                Ok(UserType::Customer) => user_counts.customer = count,
                Ok(UserType::Tradesperson) => user_counts.tradesperson = count,
                Ok(UserType::Admin) => user_counts.admin = count,
                Err(e) => log::warn!("Skipping profile count: {e}"),
            }
        }
        let total_users = user_counts.customer + user_counts.tradesperson + user_counts.admin;

        let mut portfolio_counts = PortfolioStatusCounts::default();
        for row in portfolios::Entity::find()
            .select_only()
            .column_as(portfolios::Column::Status, "grouping")
            .column_as(Expr::col(portfolios::Column::Id).count(), "count")
            .group_by(portfolios::Column::Status)
            .into_model::<GroupCountRow>()
            .all(&self.pool)
            .await?
        {
            let count = row.count.max(0) as u64;
            match row.grouping.as_str() {
                "pending" => portfolio_counts.pending = count,
                "active" => portfolio_counts.active = count,
                "suspended" => portfolio_counts.suspended = count,
                "inactive" => portfolio_counts.inactive = count,
                other => log::warn!("Skipping portfolio count for status {other}"),
            }
        }

        let featured_portfolios = portfolios::Entity::find()
            .filter(portfolios::Column::IsFeatured.eq(true))
            .count(&self.pool)
            .await?;
        let verified_portfolios = portfolios::Entity::find()
            .filter(portfolios::Column::IsVerified.eq(true))
            .count(&self.pool)
            .await?;
        let service_count = services::Entity::find().count(&self.pool).await?;

        let ratings = reviews::Entity::find()
            .select_only()
            .column_as(Expr::col(reviews::Column::Rating).sum(), "total")
            .column_as(Expr::col(reviews::Column::Id).count(), "count")
            .into_model::<RatingTotalsRow>()
            .one(&self.pool)
            .await?;
        let (review_count, average_rating) = match ratings {
            Some(RatingTotalsRow {
                total: Some(total),
                count,
            }) if count > 0 => (
                count as u64,
                ((total as f64 / count as f64) * 10.0).round() / 10.0,
            ),
            _ => (0, 0.0),
        };

        let qr_codes_total = qr_codes::Entity::find().count(&self.pool).await?;
        let qr_codes_claimed = qr_codes::Entity::find()
            .filter(qr_codes::Column::Status.eq(QrCodeStatus::Claimed))
            .count(&self.pool)
            .await?;
        let memorial_count = memorials::Entity::find().count(&self.pool).await?;
        let recent_activity = self.activity_log.recent(RECENT_ACTIVITY_LIMIT).await?;

        Ok(DashboardStats {
            users: user_counts,
            total_users,
            portfolios: portfolio_counts,
            featured_portfolios,
            verified_portfolios,
            services: service_count,
            reviews: review_count,
            average_rating,
            qr_codes_total,
            qr_codes_claimed,
            qr_codes_unclaimed: qr_codes_total.saturating_sub(qr_codes_claimed),
            memorials: memorial_count,
            recent_activity,
        })
    }

    pub async fn list_portfolios(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<PortfolioResponse>> {
        let total = portfolios::Entity::find().count(&self.pool).await?;
        let items = portfolios::Entity::find()
            .order_by_desc(portfolios::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?
            .into_iter()
            .map(PortfolioResponse::from)
            .collect();
        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn set_portfolio_status(
        &self,
        admin_id: &str,
        portfolio_id: &str,
        status: PortfolioStatus,
    ) -> AppResult<PortfolioResponse> {
        let mut model = self.find_portfolio(portfolio_id).await?.into_active_model();
        model.status = Set(status);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&self.pool).await?;

        let _ = self
            .activity_log
            .record(
                admin_id,
                "update_portfolio_status",
                "portfolio",
                Some(portfolio_id),
                Some(json!({ "status": status.to_string() })),
            )
            .await;
        Ok(updated.into())
    }

    pub async fn set_portfolio_featured(
        &self,
        admin_id: &str,
        portfolio_id: &str,
        enabled: bool,
    ) -> AppResult<PortfolioResponse> {
        let mut model = self.find_portfolio(portfolio_id).await?.into_active_model();
        model.is_featured = Set(enabled);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&self.pool).await?;

        let _ = self
            .activity_log
            .record(
                admin_id,
                "set_portfolio_featured",
                "portfolio",
                Some(portfolio_id),
                Some(json!({ "enabled": enabled })),
            )
            .await;
        Ok(updated.into())
    }

    pub async fn set_portfolio_verified(
        &self,
        admin_id: &str,
        portfolio_id: &str,
        enabled: bool,
    ) -> AppResult<PortfolioResponse> {
        let mut model = self.find_portfolio(portfolio_id).await?.into_active_model();
        model.is_verified = Set(enabled);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&self.pool).await?;

        let _ = self
            .activity_log
            .record(
                admin_id,
                "set_portfolio_verified",
                "portfolio",
                Some(portfolio_id),
                Some(json!({ "enabled": enabled })),
            )
            .await;
        Ok(updated.into())
    }

    /// Removes the portfolio with its services, reviews and location links.
    pub async fn delete_portfolio(&self, admin_id: &str, portfolio_id: &str) -> AppResult<()> {
        let portfolio = self.find_portfolio(portfolio_id).await?;

        let txn = self.pool.begin().await?;
        services::Entity::delete_many()
            .filter(services::Column::PortfolioId.eq(portfolio.id.clone()))
            .exec(&txn)
            .await?;
        reviews::Entity::delete_many()
            .filter(reviews::Column::PortfolioId.eq(portfolio.id.clone()))
            .exec(&txn)
            .await?;
        worker_locations::Entity::delete_many()
            .filter(worker_locations::Column::PortfolioId.eq(portfolio.id.clone()))
            .exec(&txn)
            .await?;
        portfolios::Entity::delete_by_id(portfolio.id.clone())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        let _ = self
            .activity_log
            .record(
                admin_id,
                "delete_portfolio",
                "portfolio",
                Some(portfolio_id),
                Some(json!({ "business_name": portfolio.business_name })),
            )
            .await;
        Ok(())
    }

    pub async fn delete_review(&self, admin_id: &str, review_id: &str) -> AppResult<()> {
        let result = reviews::Entity::delete_by_id(review_id.to_string())
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Review not found".to_string()));
        }

        let _ = self
            .activity_log
            .record(admin_id, "delete_review", "review", Some(review_id), None)
            .await;
        Ok(())
    }

    pub async fn list_settings(&self) -> AppResult<Vec<AdminSettingResponse>> {
        let items = settings::Entity::find()
            .order_by_asc(settings::Column::Key)
            .all(&self.pool)
            .await?;
        Ok(items.into_iter().map(AdminSettingResponse::from).collect())
    }

    /// Creates or replaces the setting stored under `key`.
    pub async fn update_setting(
        &self,
        admin_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> AppResult<AdminSettingResponse> {
        validate_setting_key(key)?;

        let setting = settings::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.clone()),
            updated_by: Set(Some(admin_id.to_string())),
            updated_at: Set(Utc::now()),
        };
        settings::Entity::insert(setting)
            .on_conflict(
                OnConflict::column(settings::Column::Key)
                    .update_columns([
                        settings::Column::Value,
                        settings::Column::UpdatedBy,
                        settings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        let stored = settings::Entity::find_by_id(key.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::InternalError("Setting vanished after upsert".to_string()))?;

        let _ = self
            .activity_log
            .record(
                admin_id,
                "update_setting",
                "setting",
                Some(key),
                Some(json!({ "value": value })),
            )
            .await;
        Ok(stored.into())
    }

    pub async fn list_memorials(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<MemorialResponse>> {
        let total = memorials::Entity::find().count(&self.pool).await?;
        let items = memorials::Entity::find()
            .order_by_desc(memorials::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?
            .into_iter()
            .map(MemorialResponse::from)
            .collect();
        Ok(PaginatedResponse::new(items, params, total))
    }

    async fn find_portfolio(&self, portfolio_id: &str) -> AppResult<portfolios::Model> {
        portfolios::Entity::find_by_id(portfolio_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Portfolio not found".to_string()))
    }

    async fn mirror_role(&self, user_id: &str, role: UserType) -> AppResult<()> {
        let user = users::Entity::find_by_id(user_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Identity not found".to_string()))?;

        let mut metadata = match user.app_metadata.clone() {
            Some(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        metadata.insert("role".to_string(), json!(role.to_string()));

        let mut model = user.into_active_model();
        model.app_metadata = Set(Some(serde_json::Value::Object(metadata)));
        model.updated_at = Set(Utc::now());
        model.update(&self.pool).await?;
        Ok(())
    }
}
