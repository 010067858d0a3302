use crate::entities::{
    PortfolioStatus, UserType, location_entity as locations, portfolio_entity as portfolios,
    profile_entity as profiles, review_entity as reviews, worker_location_entity as worker_locations,
    worker_service_entity as services,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::auth_service::find_user_type;
use crate::services::worker_search;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};

/// Worker directory reads plus the tradesperson's own portfolio management.
#[derive(Clone)]
pub struct PortfolioService {
    pool: DatabaseConnection,
}

/// Empty strings clear an optional text field.
fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn validate_price_range(price_from: Option<f64>, price_to: Option<f64>) -> AppResult<()> {
    if price_from.is_some_and(|p| p < 0.0) || price_to.is_some_and(|p| p < 0.0) {
        return Err(AppError::ValidationError(
            "Prices cannot be negative".to_string(),
        ));
    }
    if let (Some(from), Some(to)) = (price_from, price_to)
        && from > to
    {
        return Err(AppError::ValidationError(
            "price_from must not exceed price_to".to_string(),
        ));
    }
    Ok(())
}

impl PortfolioService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Active portfolios matching the filter, newest first.
    pub async fn list_workers(&self, filter: &WorkerFilter) -> AppResult<Vec<WorkerCard>> {
        let active = portfolios::Entity::find()
            .filter(portfolios::Column::Status.eq(PortfolioStatus::Active))
            .order_by_desc(portfolios::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let listings = self.load_listings(active).await?;
        Ok(worker_search::filter_listings(listings, filter)
            .into_iter()
            .map(WorkerCard::from)
            .collect())
    }

    pub async fn list_featured(&self) -> AppResult<Vec<WorkerCard>> {
        let featured = portfolios::Entity::find()
            .filter(portfolios::Column::Status.eq(PortfolioStatus::Active))
            .filter(portfolios::Column::IsFeatured.eq(true))
            .order_by_desc(portfolios::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let listings = self.load_listings(featured).await?;
        Ok(listings.into_iter().map(WorkerCard::from).collect())
    }

    /// Non-active portfolios are only visible to their owner and to admins.
    pub async fn get_worker(
        &self,
        portfolio_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<WorkerDetail> {
        let not_found = || AppError::NotFound("Worker not found".to_string());
        let portfolio = portfolios::Entity::find_by_id(portfolio_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(not_found)?;

        if portfolio.status != PortfolioStatus::Active {
            let allowed = match viewer_id {
                Some(viewer) if viewer == portfolio.user_id => true,
                Some(viewer) => find_user_type(&self.pool, viewer).await? == Some(UserType::Admin),
                None => false,
            };
            if !allowed {
                return Err(not_found());
            }
        }

        self.detail(portfolio).await
    }

    pub async fn get_own(&self, user_id: &str) -> AppResult<WorkerDetail> {
        let portfolio = self.own_portfolio(user_id).await?;
        self.detail(portfolio).await
    }

    pub async fn update_own(
        &self,
        user_id: &str,
        request: UpdatePortfolioRequest,
    ) -> AppResult<WorkerDetail> {
        let portfolio = self.own_portfolio(user_id).await?;
        let mut model = portfolio.into_active_model();

        if let Some(name) = request.business_name {
            let name = require_field(Some(&name), "business_name")?;
            validate_length(&name, "business_name", 2, 100)?;
            model.business_name = Set(name);
        }
        if let Some(email) = request.email {
            let email = optional_text(email).map(|e| normalize_email(&e));
            if let Some(e) = &email {
                validate_email(e)?;
            }
            model.email = Set(email);
        }
        if let Some(phone) = request.phone {
            model.phone = Set(optional_text(phone));
        }
        if let Some(location) = request.location {
            model.location = Set(optional_text(location));
        }
        if let Some(description) = request.description {
            let description = optional_text(description);
            if let Some(d) = &description {
                validate_length(d, "description", 1, 5000)?;
            }
            model.description = Set(description);
        }
        if let Some(years) = request.years_experience {
            if !(0..=80).contains(&years) {
                return Err(AppError::ValidationError(
                    "years_experience must be between 0 and 80".to_string(),
                ));
            }
            model.years_experience = Set(Some(years));
        }
        if let Some(rate) = request.hourly_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(AppError::ValidationError(
                    "hourly_rate cannot be negative".to_string(),
                ));
            }
            model.hourly_rate = Set(Some(rate));
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&self.pool).await?;
        self.detail(updated).await
    }

    pub async fn create_service(
        &self,
        user_id: &str,
        request: CreateServiceRequest,
    ) -> AppResult<WorkerServiceResponse> {
        let portfolio = self.own_portfolio(user_id).await?;
        let name = require_field(Some(&request.name), "name")?;
        validate_length(&name, "name", 2, 100)?;
        validate_price_range(request.price_from, request.price_to)?;

        let service = services::ActiveModel {
            id: Set(new_id()),
            portfolio_id: Set(portfolio.id),
            name: Set(name),
            description: Set(request.description.and_then(optional_text)),
            category: Set(request.category),
            price_from: Set(request.price_from),
            price_to: Set(request.price_to),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        Ok(service.into())
    }

    pub async fn update_service(
        &self,
        user_id: &str,
        service_id: &str,
        request: UpdateServiceRequest,
    ) -> AppResult<WorkerServiceResponse> {
        let service = self.own_service(user_id, service_id).await?;
        let price_from = request.price_from.or(service.price_from);
        let price_to = request.price_to.or(service.price_to);
        validate_price_range(price_from, price_to)?;

        let mut model = service.into_active_model();
        if let Some(name) = request.name {
            let name = require_field(Some(&name), "name")?;
            validate_length(&name, "name", 2, 100)?;
            model.name = Set(name);
        }
        if let Some(description) = request.description {
            model.description = Set(optional_text(description));
        }
        if let Some(category) = request.category {
            model.category = Set(category);
        }
        model.price_from = Set(price_from);
        model.price_to = Set(price_to);

        Ok(model.update(&self.pool).await?.into())
    }

    pub async fn delete_service(&self, user_id: &str, service_id: &str) -> AppResult<()> {
        let service = self.own_service(user_id, service_id).await?;
        services::Entity::delete_by_id(service.id)
            .exec(&self.pool)
            .await?;
        Ok(())
    }

    /// Replaces the secondary location links. Only active locations are accepted.
    pub async fn set_locations(
        &self,
        user_id: &str,
        request: SetLocationsRequest,
    ) -> AppResult<Vec<LocationResponse>> {
        let portfolio = self.own_portfolio(user_id).await?;

        let wanted: Vec<String> = request
            .location_ids
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let found = if wanted.is_empty() {
            Vec::new()
        } else {
            locations::Entity::find()
                .filter(locations::Column::Id.is_in(wanted.clone()))
                .filter(locations::Column::IsActive.eq(true))
                .order_by_asc(locations::Column::Name)
                .all(&self.pool)
                .await?
        };
        if found.len() != wanted.len() {
            return Err(AppError::ValidationError(
                "Unknown or inactive location".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        worker_locations::Entity::delete_many()
            .filter(worker_locations::Column::PortfolioId.eq(portfolio.id.clone()))
            .exec(&txn)
            .await?;
        if !found.is_empty() {
            let links = found.iter().map(|location| worker_locations::ActiveModel {
                portfolio_id: Set(portfolio.id.clone()),
                location_id: Set(location.id.clone()),
            });
            worker_locations::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        Ok(found.into_iter().map(LocationResponse::from).collect())
    }

    /// One review per customer per active portfolio.
    pub async fn add_review(
        &self,
        customer_id: &str,
        portfolio_id: &str,
        request: CreateReviewRequest,
    ) -> AppResult<ReviewResponse> {
        if find_user_type(&self.pool, customer_id).await? != Some(UserType::Customer) {
            return Err(AppError::Forbidden(
                "Only customers can leave reviews".to_string(),
            ));
        }
        if !(1..=5).contains(&request.rating) {
            return Err(AppError::ValidationError(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let portfolio = portfolios::Entity::find_by_id(portfolio_id.to_string())
            .one(&self.pool)
            .await?
            .filter(|p| p.status == PortfolioStatus::Active)
            .ok_or_else(|| AppError::NotFound("Worker not found".to_string()))?;

        let existing = reviews::Entity::find()
            .filter(reviews::Column::PortfolioId.eq(portfolio.id.clone()))
            .filter(reviews::Column::CustomerId.eq(customer_id))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "You have already reviewed this worker".to_string(),
            ));
        }

        let comment = request.comment.and_then(optional_text);
        if let Some(c) = &comment {
            validate_length(c, "comment", 1, 2000)?;
        }

        let review = reviews::ActiveModel {
            id: Set(new_id()),
            portfolio_id: Set(portfolio.id),
            customer_id: Set(customer_id.to_string()),
            rating: Set(request.rating),
            comment: Set(comment),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        let mut response = ReviewResponse::from(review);
        response.customer_name = profiles::Entity::find_by_id(customer_id.to_string())
            .one(&self.pool)
            .await?
            .map(|p| p.full_name);
        Ok(response)
    }

    async fn own_portfolio(&self, user_id: &str) -> AppResult<portfolios::Model> {
        if find_user_type(&self.pool, user_id).await? != Some(UserType::Tradesperson) {
            return Err(AppError::Forbidden(
                "Only tradespeople can manage a portfolio".to_string(),
            ));
        }
        portfolios::Entity::find()
            .filter(portfolios::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Portfolio not found".to_string()))
    }

    /// A service belonging to someone else's portfolio is reported as missing.
    async fn own_service(&self, user_id: &str, service_id: &str) -> AppResult<services::Model> {
        let portfolio = self.own_portfolio(user_id).await?;
        services::Entity::find_by_id(service_id.to_string())
            .filter(services::Column::PortfolioId.eq(portfolio.id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))
    }

    async fn detail(&self, portfolio: portfolios::Model) -> AppResult<WorkerDetail> {
        let mut listings = self.load_listings(vec![portfolio]).await?;
        listings
            .pop()
            .map(WorkerDetail::from)
            .ok_or_else(|| AppError::InternalError("Listing lost while loading".to_string()))
    }

    /// Joins portfolios with their services, reviews and active secondary locations,
    /// keeping the input order.
    async fn load_listings(
        &self,
        portfolio_rows: Vec<portfolios::Model>,
    ) -> AppResult<Vec<WorkerListing>> {
        if portfolio_rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = portfolio_rows.iter().map(|p| p.id.clone()).collect();

        let mut services_by_portfolio: HashMap<String, Vec<WorkerServiceResponse>> = HashMap::new();
        for service in services::Entity::find()
            .filter(services::Column::PortfolioId.is_in(ids.clone()))
            .order_by_asc(services::Column::CreatedAt)
            .all(&self.pool)
            .await?
        {
            services_by_portfolio
                .entry(service.portfolio_id.clone())
                .or_default()
                .push(service.into());
        }

        let review_rows = reviews::Entity::find()
            .filter(reviews::Column::PortfolioId.is_in(ids.clone()))
            .order_by_desc(reviews::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        let customer_ids: Vec<String> = review_rows
            .iter()
            .map(|r| r.customer_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let customer_names: HashMap<String, String> = if customer_ids.is_empty() {
            HashMap::new()
        } else {
            profiles::Entity::find()
                .filter(profiles::Column::UserId.is_in(customer_ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|p| (p.user_id, p.full_name))
                .collect()
        };
        let mut reviews_by_portfolio: HashMap<String, Vec<ReviewResponse>> = HashMap::new();
        for review in review_rows {
            let mut response = ReviewResponse::from(review);
            response.customer_name = customer_names.get(&response.customer_id).cloned();
            reviews_by_portfolio
                .entry(response.portfolio_id.clone())
                .or_default()
                .push(response);
        }

        let mut locations_by_portfolio: HashMap<String, Vec<String>> = HashMap::new();
        for (link, location) in worker_locations::Entity::find()
            .filter(worker_locations::Column::PortfolioId.is_in(ids))
            .find_also_related(locations::Entity)
            .all(&self.pool)
            .await?
        {
            if let Some(location) = location.filter(|l| l.is_active) {
                locations_by_portfolio
                    .entry(link.portfolio_id)
                    .or_default()
                    .push(location.name);
            }
        }

        Ok(portfolio_rows
            .into_iter()
            .map(|portfolio| {
                let mut secondary_locations = locations_by_portfolio
                    .remove(&portfolio.id)
                    .unwrap_or_default();
                secondary_locations.sort();
                WorkerListing {
                    services: services_by_portfolio
                        .remove(&portfolio.id)
                        .unwrap_or_default(),
                    reviews: reviews_by_portfolio
                        .remove(&portfolio.id)
                        .unwrap_or_default(),
                    secondary_locations,
                    portfolio: portfolio.into(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TradeCategory;
    use crate::test_support::*;

    struct Directory {
        db: DatabaseConnection,
        ace_owner: String,
        ace: String,
        bright: String,
        customer: String,
    }

    async fn directory() -> Directory {
        let db = setup_test_db().await;
        let ace_owner = insert_user(&db, "ace@example.com", UserType::Tradesperson).await;
        let bright_owner = insert_user(&db, "bright@example.com", UserType::Tradesperson).await;
        let customer = insert_user(&db, "cust@example.com", UserType::Customer).await;
        let other = insert_user(&db, "other@example.com", UserType::Customer).await;

        let ace = insert_portfolio(&db, &ace_owner, "Ace Plumbing", "Dublin", PortfolioStatus::Active).await;
        insert_service(&db, &ace, "Boiler repair", TradeCategory::Plumbing).await;
        insert_review(&db, &ace, &customer, 5).await;
        insert_review(&db, &ace, &other, 4).await;

        let bright = insert_portfolio(&db, &bright_owner, "Bright Electric", "Cork", PortfolioStatus::Active).await;
        insert_service(&db, &bright, "Rewiring", TradeCategory::Electrical).await;

        Directory {
            db,
            ace_owner,
            ace,
            bright,
            customer,
        }
    }

    fn filter(category: Option<&str>, location: Option<&str>) -> WorkerFilter {
        WorkerFilter {
            search: None,
            category: category.map(String::from),
            location: location.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_directory_filters_by_category_and_location() {
        let dir = directory().await;
        let svc = PortfolioService::new(dir.db.clone());

        let plumbers = svc.list_workers(&filter(Some("plumbing"), None)).await.unwrap();
        assert_eq!(plumbers.len(), 1);
        assert_eq!(plumbers[0].portfolio.business_name, "Ace Plumbing");
        assert_eq!(plumbers[0].average_rating, 4.5);

        let cork = svc.list_workers(&filter(None, Some("cork"))).await.unwrap();
        assert_eq!(cork.len(), 1);
        assert_eq!(cork[0].portfolio.business_name, "Bright Electric");
        assert_eq!(cork[0].average_rating, 0.0);
    }

    #[tokio::test]
    async fn test_secondary_locations_are_searchable() {
        let dir = directory().await;
        let svc = PortfolioService::new(dir.db.clone());
        let kildare = insert_location(&dir.db, "Kildare", true).await;

        let linked = svc
            .set_locations(
                &dir.ace_owner,
                SetLocationsRequest {
                    location_ids: vec![kildare.clone(), kildare],
                },
            )
            .await
            .unwrap();
        assert_eq!(linked.len(), 1);

        let result = svc.list_workers(&filter(None, Some("kildare"))).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].portfolio.id, dir.ace);
        assert_eq!(result[0].secondary_locations, vec!["Kildare".to_string()]);
    }

    #[tokio::test]
    async fn test_inactive_locations_are_rejected() {
        let dir = directory().await;
        let closed = insert_location(&dir.db, "Atlantis", false).await;
        let err = PortfolioService::new(dir.db.clone())
            .set_locations(
                &dir.ace_owner,
                SetLocationsRequest {
                    location_ids: vec![closed],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_pending_portfolio_hidden_from_public() {
        let db = setup_test_db().await;
        let owner = insert_user(&db, "new@example.com", UserType::Tradesperson).await;
        let admin = insert_user(&db, "admin@example.com", UserType::Admin).await;
        let stranger = insert_user(&db, "guest@example.com", UserType::Customer).await;
        let pending = insert_portfolio(&db, &owner, "New Trades", "Galway", PortfolioStatus::Pending).await;
        let svc = PortfolioService::new(db);

        assert!(svc.list_workers(&WorkerFilter::default()).await.unwrap().is_empty());
        assert!(matches!(
            svc.get_worker(&pending, None).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(svc.get_worker(&pending, Some(&stranger)).await.is_err());
        assert!(svc.get_worker(&pending, Some(&owner)).await.is_ok());
        assert!(svc.get_worker(&pending, Some(&admin)).await.is_ok());
    }

    #[tokio::test]
    async fn test_self_service_requires_tradesperson() {
        let dir = directory().await;
        let svc = PortfolioService::new(dir.db.clone());

        let err = svc.get_own(&dir.customer).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let updated = svc
            .update_own(
                &dir.ace_owner,
                UpdatePortfolioRequest {
                    hourly_rate: Some(55.0),
                    description: Some("Emergency callouts".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.card.portfolio.hourly_rate, Some(55.0));

        let err = svc
            .update_own(
                &dir.ace_owner,
                UpdatePortfolioRequest {
                    years_experience: Some(120),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_services_are_scoped_to_owner() {
        let dir = directory().await;
        let svc = PortfolioService::new(dir.db.clone());
        let bright_owner = portfolios::Entity::find_by_id(dir.bright.clone())
            .one(&dir.db)
            .await
            .unwrap()
            .unwrap()
            .user_id;

        let created = svc
            .create_service(
                &dir.ace_owner,
                CreateServiceRequest {
                    name: "Drain unblocking".to_string(),
                    description: None,
                    category: TradeCategory::Plumbing,
                    price_from: Some(50.0),
                    price_to: Some(120.0),
                },
            )
            .await
            .unwrap();

        let err = svc
            .delete_service(&bright_owner, &created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = svc
            .update_service(
                &dir.ace_owner,
                &created.id,
                UpdateServiceRequest {
                    price_from: Some(200.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        svc.delete_service(&dir.ace_owner, &created.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_review_rules() {
        let dir = directory().await;
        let svc = PortfolioService::new(dir.db.clone());
        let review = |rating| CreateReviewRequest {
            rating,
            comment: Some("Great job".to_string()),
        };

        let created = svc.add_review(&dir.customer, &dir.bright, review(4)).await.unwrap();
        assert_eq!(created.customer_name.as_deref(), Some("cust"));

        let dup = svc.add_review(&dir.customer, &dir.bright, review(5)).await.unwrap_err();
        assert!(matches!(dup, AppError::ValidationError(_)));

        let out_of_range = svc.add_review(&dir.customer, &dir.ace, review(6)).await.unwrap_err();
        assert!(matches!(out_of_range, AppError::ValidationError(_)));

        let not_customer = svc.add_review(&dir.ace_owner, &dir.bright, review(5)).await.unwrap_err();
        assert!(matches!(not_customer, AppError::Forbidden(_)));

        let detail = svc.get_worker(&dir.bright, None).await.unwrap();
        assert_eq!(detail.card.average_rating, 4.0);
        assert_eq!(detail.reviews.len(), 1);
    }
}
