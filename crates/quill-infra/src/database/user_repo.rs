//! SeaORM user repository.

use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use quill_core::domain::User;
use quill_core::error::RepoError;
use quill_core::ports::UserRepository;

use super::entity::user::{self, Entity as UserEntity};

/// PostgreSQL user repository.
pub struct SeaOrmUserRepository {
    db: DbConn,
}

impl SeaOrmUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, new_user: User) -> Result<User, RepoError> {
        let model: user::ActiveModel = new_user.into();
        let inserted = model.insert(&self.db).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("duplicate") || msg.contains("unique") {
                RepoError::Constraint("username or email already taken".to_string())
            } else {
                RepoError::Query(msg)
            }
        })?;

        Ok(inserted.into())
    }

    async fn update(&self, updated: User) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            id: Unchanged(updated.id),
            username: Set(updated.username),
            email: Set(updated.email),
            password_hash: Set(updated.password_hash),
            bio: Set(updated.bio),
            created_at: NotSet,
            updated_at: Set(updated.updated_at.into()),
        };

        let saved = model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => RepoError::NotFound,
            other => RepoError::Query(other.to_string()),
        })?;

        Ok(saved.into())
    }
}
