//! Authorization predicates for post mutations.
//!
//! Single source of truth for who may do what: edit and delete are
//! author-only, likes and comments only require an authenticated actor.
//! The services call these; handlers never re-implement them.

use uuid::Uuid;

use crate::domain::Post;
use crate::error::DomainError;

/// `true` when a principal was resolved for the request.
pub fn is_authenticated(actor: Option<Uuid>) -> bool {
    actor.is_some()
}

/// `true` when the actor is the post's author. Absent actors never qualify.
pub fn can_mutate(post: &Post, actor: Option<Uuid>) -> bool {
    matches!(actor, Some(id) if id == post.author_id)
}

/// Resolve the acting principal or reject the request.
pub fn require_actor(actor: Option<Uuid>) -> Result<Uuid, DomainError> {
    actor.ok_or(DomainError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_owned_by(author_id: Uuid) -> Post {
        Post::new(
            author_id,
            "a-post".to_string(),
            "A post".to_string(),
            "<p>body</p>".to_string(),
            vec![],
            None,
        )
    }

    #[test]
    fn author_can_mutate_own_post() {
        let author = Uuid::new_v4();
        let post = post_owned_by(author);

        assert!(can_mutate(&post, Some(author)));
    }

    #[test]
    fn other_users_and_anonymous_cannot_mutate() {
        let post = post_owned_by(Uuid::new_v4());

        assert!(!can_mutate(&post, Some(Uuid::new_v4())));
        assert!(!can_mutate(&post, None));
    }

    #[test]
    fn is_authenticated_requires_a_principal() {
        assert!(is_authenticated(Some(Uuid::new_v4())));
        assert!(!is_authenticated(None));
    }
}
