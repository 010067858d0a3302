use crate::entities::activity_log_entity as logs;
use crate::error::AppResult;
use crate::models::*;
use crate::utils::{NonFatal, new_id};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
    Set,
};

/// Append-only audit trail of admin mutations.
#[derive(Clone)]
pub struct ActivityLogService {
    pool: DatabaseConnection,
}

impl ActivityLogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Appends an entry. Failure is reported, never propagated, so the mutation it
    /// describes stands even when the audit write does not.
    pub async fn record(
        &self,
        admin_id: &str,
        action: &str,
        target_type: &str,
        target_id: Option<&str>,
        details: Option<serde_json::Value>,
    ) -> NonFatal<()> {
        let entry = logs::ActiveModel {
            id: Set(new_id()),
            admin_id: Set(admin_id.to_string()),
            action: Set(action.to_string()),
            target_type: Set(target_type.to_string()),
            target_id: Set(target_id.map(str::to_string)),
            details: Set(details),
            created_at: Set(Utc::now()),
        };
        let result = entry.insert(&self.pool).await.map(|_| ()).map_err(Into::into);
        NonFatal::tolerate("admin activity log write", result)
    }

    pub async fn list(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<ActivityLogResponse>> {
        let total = logs::Entity::find().count(&self.pool).await?;
        let items = logs::Entity::find()
            .order_by_desc(logs::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?
            .into_iter()
            .map(ActivityLogResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn recent(&self, limit: u64) -> AppResult<Vec<ActivityLogResponse>> {
        let items = logs::Entity::find()
            .order_by_desc(logs::Column::CreatedAt)
            .limit(limit)
            .all(&self.pool)
            .await?;
        Ok(items.into_iter().map(ActivityLogResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use sea_orm::ConnectionTrait;

    #[tokio::test]
    async fn test_record_and_list_newest_first() {
        let db = setup_test_db().await;
        let log = ActivityLogService::new(db);

        for action in ["create_location", "delete_review", "update_setting"] {
            let outcome = log.record("admin-1", action, "test", None, None).await;
            assert!(outcome.is_applied());
        }

        let page = log.list(&PaginationParams::new(Some(1), Some(2))).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 2);

        let recent = log.recent(10).await.unwrap();
        assert_eq!(recent.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_write_is_reported_not_raised() {
        let db = setup_test_db().await;
        db.execute_unprepared("DROP TABLE admin_activity_logs")
            .await
            .unwrap();

        let outcome = ActivityLogService::new(db)
            .record("admin-1", "delete_review", "review", Some("r-1"), None)
            .await;
        assert!(matches!(outcome, NonFatal::Skipped { .. }));
    }
}
