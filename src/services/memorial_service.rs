use crate::entities::memorial_entity as memorials;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

const MAX_PHOTOS: usize = 50;

#[derive(Clone)]
pub struct MemorialService {
    pool: DatabaseConnection,
}

impl MemorialService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_mine(&self, user_id: &str) -> AppResult<Vec<MemorialResponse>> {
        let items = memorials::Entity::find()
            .filter(memorials::Column::OwnerId.eq(user_id))
            .order_by_desc(memorials::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(items.into_iter().map(MemorialResponse::from).collect())
    }

    /// Private memorials are reported as missing to everyone but the owner.
    pub async fn get(&self, memorial_id: &str, viewer_id: Option<&str>) -> AppResult<MemorialResponse> {
        let memorial = self.find(memorial_id).await?;
        if !memorial.is_public && viewer_id != Some(memorial.owner_id.as_str()) {
            return Err(AppError::NotFound("Memorial not found".to_string()));
        }
        Ok(memorial.into())
    }

    pub async fn update(
        &self,
        user_id: &str,
        memorial_id: &str,
        request: UpdateMemorialRequest,
    ) -> AppResult<MemorialResponse> {
        let memorial = self.find(memorial_id).await?;
        if memorial.owner_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can edit this memorial".to_string(),
            ));
        }

        let birth_date = request.birth_date.or(memorial.birth_date);
        let death_date = request.death_date.or(memorial.death_date);
        if let (Some(birth), Some(death)) = (birth_date, death_date)
            && birth > death
        {
            return Err(AppError::ValidationError(
                "birth_date must not be after death_date".to_string(),
            ));
        }

        let mut model = memorial.into_active_model();
        if let Some(title) = request.title {
            let title = require_field(Some(&title), "title")?;
            validate_length(&title, "title", 1, 200)?;
            model.title = Set(title);
        }
        if let Some(description) = request.description {
            let description = description.trim();
            if !description.is_empty() {
                validate_length(description, "description", 1, 10_000)?;
            }
            model.description = Set(Some(description.to_string()).filter(|d| !d.is_empty()));
        }
        if let Some(url) = request.profile_picture_url {
            let url = url.trim();
            if !url.is_empty() {
                validate_http_url(url, "profile_picture_url")?;
            }
            model.profile_picture_url = Set(Some(url.to_string()).filter(|u| !u.is_empty()));
        }
        if let Some(photos) = request.photos {
            if photos.len() > MAX_PHOTOS {
                return Err(AppError::ValidationError(format!(
                    "A memorial holds at most {MAX_PHOTOS} photos"
                )));
            }
            for photo in &photos {
                validate_http_url(photo, "photos")?;
            }
            model.photos = Set(serde_json::to_value(photos)?);
        }
        if let Some(is_public) = request.is_public {
            model.is_public = Set(is_public);
        }
        model.birth_date = Set(birth_date);
        model.death_date = Set(death_date);
        model.updated_at = Set(Utc::now());

        Ok(model.update(&self.pool).await?.into())
    }

    async fn find(&self, memorial_id: &str) -> AppResult<memorials::Model> {
        memorials::Entity::find_by_id(memorial_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Memorial not found".to_string()))
    }
}
