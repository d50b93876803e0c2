use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::authz;
use crate::domain::Post;
use crate::error::{DomainError, RepoError};
use crate::ports::PostRepository;

/// Interaction engine: likes and comments.
///
/// Any authenticated user may like or comment. Both operations delegate to
/// the repository's atomic primitives so the collection mutation and the
/// counter recompute land in one commit.
pub struct InteractionService {
    repo: Arc<dyn PostRepository>,
}

impl InteractionService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Toggle the actor's like on a post.
    ///
    /// Two toggles by the same user return the post to its prior state. A
    /// retried toggle flips the state again; callers must not retry on
    /// timeout.
    pub async fn toggle_like(
        &self,
        post_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<Post, DomainError> {
        let user_id = authz::require_actor(actor)?;

        self.repo
            .toggle_like(post_id, user_id)
            .await
            .map_err(|err| not_found_or(post_id, err))
    }

    /// Append a comment to a post with a server-assigned timestamp.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        actor: Option<Uuid>,
        content: &str,
    ) -> Result<Post, DomainError> {
        let author_id = authz::require_actor(actor)?;

        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::Validation(
                "comment content must not be empty".to_string(),
            ));
        }

        self.repo
            .add_comment(post_id, author_id, content, Utc::now())
            .await
            .map_err(|err| not_found_or(post_id, err))
    }
}

fn not_found_or(post_id: Uuid, err: RepoError) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::NotFound(format!("post '{post_id}'")),
        other => other.into(),
    }
}
