use crate::entities::{location_entity as locations, service_category_entity as categories};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::ActivityLogService;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde_json::json;

/// Admin-managed lookup lists: locations and service categories.
#[derive(Clone)]
pub struct ReferenceService {
    pool: DatabaseConnection,
    activity_log: ActivityLogService,
}

fn clean_name(name: &str) -> AppResult<String> {
    let name = require_field(Some(name), "name")?;
    validate_length(&name, "name", 2, 100)?;
    Ok(name)
}

impl ReferenceService {
    pub fn new(pool: DatabaseConnection, activity_log: ActivityLogService) -> Self {
        Self { pool, activity_log }
    }

    pub async fn list_locations(&self, include_inactive: bool) -> AppResult<Vec<LocationResponse>> {
        let mut query = locations::Entity::find().order_by_asc(locations::Column::Name);
        if !include_inactive {
            query = query.filter(locations::Column::IsActive.eq(true));
        }
        let items = query.all(&self.pool).await?;
        Ok(items.into_iter().map(LocationResponse::from).collect())
    }

    pub async fn create_location(
        &self,
        admin_id: &str,
        request: CreateLocationRequest,
    ) -> AppResult<LocationResponse> {
        let name = clean_name(&request.name)?;
        self.ensure_location_name_free(&name, None).await?;

        let location = locations::ActiveModel {
            id: Set(new_id()),
            name: Set(name),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        let _ = self
            .activity_log
            .record(
                admin_id,
                "create_location",
                "location",
                Some(&location.id),
                Some(json!({ "name": location.name })),
            )
            .await;
        Ok(location.into())
    }

    pub async fn update_location(
        &self,
        admin_id: &str,
        location_id: &str,
        request: UpdateLocationRequest,
    ) -> AppResult<LocationResponse> {
        let mut model = locations::Entity::find_by_id(location_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Location not found".to_string()))?
            .into_active_model();

        if let Some(name) = &request.name {
            let name = clean_name(name)?;
            self.ensure_location_name_free(&name, Some(location_id)).await?;
            model.name = Set(name);
        }
        if let Some(is_active) = request.is_active {
            model.is_active = Set(is_active);
        }
        let location = model.update(&self.pool).await?;

        let _ = self
            .activity_log
            .record(
                admin_id,
                "update_location",
                "location",
                Some(&location.id),
                Some(json!({ "name": location.name, "is_active": location.is_active })),
            )
            .await;
        Ok(location.into())
    }

    pub async fn delete_location(&self, admin_id: &str, location_id: &str) -> AppResult<()> {
        let result = locations::Entity::delete_by_id(location_id.to_string())
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Location not found".to_string()));
        }

        let _ = self
            .activity_log
            .record(admin_id, "delete_location", "location", Some(location_id), None)
            .await;
        Ok(())
    }

    pub async fn list_categories(
        &self,
        include_inactive: bool,
    ) -> AppResult<Vec<ServiceCategoryResponse>> {
        let mut query = categories::Entity::find().order_by_asc(categories::Column::Name);
        if !include_inactive {
            query = query.filter(categories::Column::IsActive.eq(true));
        }
        let items = query.all(&self.pool).await?;
        Ok(items.into_iter().map(ServiceCategoryResponse::from).collect())
    }

    pub async fn create_category(
        &self,
        admin_id: &str,
        request: CreateServiceCategoryRequest,
    ) -> AppResult<ServiceCategoryResponse> {
        let name = clean_name(&request.name)?;
        self.ensure_category_name_free(&name, None).await?;

        let category = categories::ActiveModel {
            id: Set(new_id()),
            name: Set(name),
            description: Set(request.description.filter(|d| !d.trim().is_empty())),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        let _ = self
            .activity_log
            .record(
                admin_id,
                "create_service_category",
                "service_category",
                Some(&category.id),
                Some(json!({ "name": category.name })),
            )
            .await;
        Ok(category.into())
    }

    pub async fn update_category(
        &self,
        admin_id: &str,
        category_id: &str,
        request: UpdateServiceCategoryRequest,
    ) -> AppResult<ServiceCategoryResponse> {
        let mut model = categories::Entity::find_by_id(category_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Service category not found".to_string()))?
            .into_active_model();

        if let Some(name) = &request.name {
            let name = clean_name(name)?;
            self.ensure_category_name_free(&name, Some(category_id)).await?;
            model.name = Set(name);
        }
        if let Some(description) = request.description {
            model.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
        }
        if let Some(is_active) = request.is_active {
            model.is_active = Set(is_active);
        }
        let category = model.update(&self.pool).await?;

        let _ = self
            .activity_log
            .record(
                admin_id,
                "update_service_category",
                "service_category",
                Some(&category.id),
                Some(json!({ "name": category.name, "is_active": category.is_active })),
            )
            .await;
        Ok(category.into())
    }

    pub async fn delete_category(&self, admin_id: &str, category_id: &str) -> AppResult<()> {
        let result = categories::Entity::delete_by_id(category_id.to_string())
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Service category not found".to_string()));
        }

        let _ = self
            .activity_log
            .record(
                admin_id,
                "delete_service_category",
                "service_category",
                Some(category_id),
                None,
            )
            .await;
        Ok(())
    }

    async fn ensure_location_name_free(&self, name: &str, except: Option<&str>) -> AppResult<()> {
        let mut query = locations::Entity::find().filter(locations::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(locations::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "Location {name} already exists"
            )));
        }
        Ok(())
    }

    async fn ensure_category_name_free(&self, name: &str, except: Option<&str>) -> AppResult<()> {
        let mut query = categories::Entity::find().filter(categories::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "Service category {name} already exists"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    fn service(db: DatabaseConnection) -> ReferenceService {
        ReferenceService::new(db.clone(), ActivityLogService::new(db))
    }

    #[tokio::test]
    async fn test_public_lists_hide_inactive() {
        let db = setup_test_db().await;
        insert_location(&db, "Dublin", true).await;
        insert_location(&db, "Atlantis", false).await;
        let refs = service(db);

        let public = refs.list_locations(false).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].name, "Dublin");
        assert_eq!(refs.list_locations(true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_category_crud_logs_activity() {
        let db = setup_test_db().await;
        let refs = service(db.clone());

        let created = refs
            .create_category(
                "admin-1",
                CreateServiceCategoryRequest {
                    name: "Plumbing".to_string(),
                    description: Some("Pipes and boilers".to_string()),
                    is_active: None,
                },
            )
            .await
            .unwrap();
        assert!(created.is_active);

        let duplicate = refs
            .create_category(
                "admin-1",
                CreateServiceCategoryRequest {
                    name: "Plumbing".to_string(),
                    description: None,
                    is_active: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(duplicate, AppError::ValidationError(_)));

        let updated = refs
            .update_category(
                "admin-1",
                &created.id,
                UpdateServiceCategoryRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.is_active);
        assert!(refs.list_categories(false).await.unwrap().is_empty());

        refs.delete_category("admin-1", &created.id).await.unwrap();
        let missing = refs.delete_category("admin-1", &created.id).await.unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));

        let log = ActivityLogService::new(db).recent(10).await.unwrap();
        assert_eq!(log.len(), 3);
    }
}
