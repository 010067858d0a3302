use crate::entities::{
    PortfolioStatus, UserType, portfolio_entity as portfolios, profile_entity as profiles,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

/// Inserts the login identity and its profile. Callers wrap this in a transaction so
/// a failed profile insert never leaves an orphaned identity behind.
pub(crate) async fn insert_identity<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    password_hash: String,
    full_name: &str,
    user_type: UserType,
) -> AppResult<users::Model> {
    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(new_id()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        app_metadata: Set(Some(serde_json::json!({ "role": user_type.to_string() }))),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    profiles::ActiveModel {
        user_id: Set(user.id.clone()),
        full_name: Set(full_name.to_string()),
        user_type: Set(user_type),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    Ok(user)
}

/// Rejects an email that already has an identity.
pub(crate) async fn ensure_email_available<C: ConnectionTrait>(conn: &C, email: &str) -> AppResult<()> {
    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(conn)
        .await?;
    if existing.is_some() {
        return Err(AppError::ValidationError(
            "Email is already registered".to_string(),
        ));
    }
    Ok(())
}

/// Profile view of a user, including the portfolio id for tradespeople.
pub(crate) async fn load_profile<C: ConnectionTrait>(
    conn: &C,
    user: &users::Model,
) -> AppResult<ProfileResponse> {
    let profile = profiles::Entity::find_by_id(user.id.clone())
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let portfolio_id = portfolios::Entity::find()
        .filter(portfolios::Column::UserId.eq(user.id.clone()))
        .one(conn)
        .await?
        .map(|p| p.id);

    Ok(ProfileResponse {
        user_id: user.id.clone(),
        email: user.email.clone(),
        full_name: profile.full_name,
        user_type: profile.user_type,
        portfolio_id,
        created_at: profile.created_at,
    })
}

/// Role of the user, or `None` when the user has no profile.
pub(crate) async fn find_user_type<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
) -> AppResult<Option<UserType>> {
    let profile = profiles::Entity::find_by_id(user_id.to_string())
        .one(conn)
        .await?;
    Ok(profile.map(|p| p.user_type))
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn signup(&self, request: SignupRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password)?;

        let full_name = require_field(Some(&request.full_name), "full_name")?;
        validate_length(&full_name, "full_name", 2, 100)?;

        let user_type: UserType = request
            .user_type
            .parse()
            .map_err(AppError::ValidationError)?;
        if user_type == UserType::Admin {
            return Err(AppError::ValidationError(
                "Admin accounts cannot be created through signup".to_string(),
            ));
        }

        ensure_email_available(&self.pool, &email).await?;
        let password_hash = hash_password(&request.password)?;

        let txn = self.pool.begin().await?;
        let user = insert_identity(&txn, &email, password_hash, &full_name, user_type).await?;

        if user_type == UserType::Tradesperson {
            let business_name = request
                .business_name
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .unwrap_or(&full_name)
                .to_string();
            let now = Utc::now();
            portfolios::ActiveModel {
                id: Set(new_id()),
                user_id: Set(user.id.clone()),
                business_name: Set(business_name),
                email: Set(Some(email.clone())),
                phone: Set(request.phone.clone()),
                location: Set(request.location.clone()),
                description: Set(None),
                years_experience: Set(None),
                hourly_rate: Set(None),
                status: Set(PortfolioStatus::Pending),
                is_verified: Set(false),
                is_featured: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }
        txn.commit().await?;

        log::info!("New {} account registered: {}", user_type, user.id);
        self.issue_tokens(&user).await
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        let invalid = || AppError::AuthError("Invalid email or password".to_string());

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.pool)
            .await?
            .ok_or_else(invalid)?;

        // A malformed stored hash is treated like a wrong password
        if !verify_password(&request.password, &user.password_hash).unwrap_or(false) {
            return Err(invalid());
        }

        self.issue_tokens(&user).await
    }

    pub async fn refresh_token(&self, request: RefreshTokenRequest) -> AppResult<RefreshTokenResponse> {
        let claims = self.jwt_service.verify_refresh_token(&request.refresh_token)?;

        let user = users::Entity::find_by_id(claims.sub)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Account no longer exists".to_string()))?;

        let access_token = self.jwt_service.generate_access_token(&user.id, &user.email)?;
        Ok(RefreshTokenResponse {
            access_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn me(&self, user_id: &str) -> AppResult<ProfileResponse> {
        let user = users::Entity::find_by_id(user_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        load_profile(&self.pool, &user).await
    }

    async fn issue_tokens(&self, user: &users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(&user.id, &user.email)?;
        let refresh_token = self.jwt_service.generate_refresh_token(&user.id, &user.email)?;
        let profile = load_profile(&self.pool, user).await?;

        Ok(AuthResponse {
            profile,
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}
