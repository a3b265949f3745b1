use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::{prelude::*, *};
use crate::models::{CurrentUser, LoginForm, NewUser, Session};
use crate::utils::auth::{create_jwt, hash_password, validate_jwt, verify_password};
use crate::utils::validation::invalid_credentials_format;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub struct AuthService {
    db: DatabaseConnection,
    config: AppConfig,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self { db, config }
    }

    /// Creates an account and returns the new user id.
    pub async fn register(&self, new_user: NewUser) -> Result<i32, AppError> {
        new_user
            .validate()
            .map_err(|_| invalid_credentials_format())?;

        let existing = Users::find()
            .filter(users::Column::Username.eq(&new_user.username))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateUsername);
        }

        let password_hash = hash_password(&new_user.password)?;

        let user = users::ActiveModel {
            username: Set(new_user.username),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        // The unique index still decides when two registrations race
        let user = user.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateUsername,
            _ => AppError::Database(e),
        })?;

        info!("👤 Registered user '{}' (id {})", user.username, user.id);
        Ok(user.id)
    }

    /// Verifies credentials and opens a new session.
    pub async fn login(&self, form: LoginForm) -> Result<Session, AppError> {
        let user = Users::find()
            .filter(users::Column::Username.eq(&form.username))
            .one(&self.db)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&form.password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let now = Utc::now();
        let expires_at = Duration::try_hours(self.config.session_ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "session lifetime of {} hours is out of range",
                    self.config.session_ttl_hours
                ))
            })?;
        let session_id = Uuid::new_v4().to_string();

        let session = sessions::ActiveModel {
            id: Set(session_id.clone()),
            user_id: Set(user.id),
            created_at: Set(now),
            expires_at: Set(expires_at),
        };
        session.insert(&self.db).await?;

        let token = create_jwt(
            user.id,
            &user.username,
            &session_id,
            expires_at,
            &self.config.jwt_secret,
        )?;

        info!("🔑 User '{}' logged in", user.username);

        Ok(Session {
            token,
            user: CurrentUser {
                id: user.id,
                username: user.username,
                session_id,
            },
            expires_at,
        })
    }

    /// Revokes a session. Unknown ids are ignored.
    pub async fn logout(&self, session_id: &str) -> Result<(), AppError> {
        Sessions::delete_by_id(session_id.to_string())
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Resolves a session token to the identity it was issued for.
    pub async fn current_user(&self, token: &str) -> Result<CurrentUser, AppError> {
        let claims =
            validate_jwt(token, &self.config.jwt_secret).map_err(|_| AppError::Unauthenticated)?;
        let user_id = claims.user_id().map_err(|_| AppError::Unauthenticated)?;

        let session = Sessions::find_by_id(claims.jti.clone())
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        if session.user_id != user_id || session.expires_at <= Utc::now() {
            return Err(AppError::Unauthenticated);
        }

        Ok(CurrentUser {
            id: user_id,
            username: claims.username,
            session_id: claims.jti,
        })
    }
}
