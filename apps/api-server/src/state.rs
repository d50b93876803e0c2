//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::UserRepository;
use quill_core::service::{InteractionService, PostService};
use quill_infra::{DbClient, DbConfig, DbErr, SeaOrmPostRepository, SeaOrmUserRepository};

/// Shared application state.
///
/// The storage client is opened once here and handed into the services; no
/// module-level connection exists anywhere.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub interactions: Arc<InteractionService>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Connect to the database and build the services.
    pub async fn new(db_config: &DbConfig) -> Result<(Self, DbClient), DbErr> {
        let db = DbClient::connect(db_config).await?;

        let post_repo = Arc::new(SeaOrmPostRepository::new(db.conn().clone()));
        let users: Arc<dyn UserRepository> =
            Arc::new(SeaOrmUserRepository::new(db.conn().clone()));

        let state = Self {
            posts: Arc::new(PostService::new(post_repo.clone())),
            interactions: Arc::new(InteractionService::new(post_repo)),
            users,
        };

        tracing::info!("application state initialized");

        Ok((state, db))
    }
}
