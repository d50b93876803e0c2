use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Post entity - a blog post with its embedded interaction state.
///
/// The post owns an append-only sequence of comments (oldest first) and a set
/// of liker user ids. `like_count` and `comment_count` are denormalized and
/// must equal the size of their backing collections after every committed
/// mutation; `view_count` only grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub likes: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with zeroed counters and empty collections.
    pub fn new(
        author_id: Uuid,
        slug: String,
        title: String,
        content: String,
        tags: Vec<String>,
        featured_image: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            slug,
            title,
            content,
            tags,
            featured_image,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given user is in the like set.
    pub fn liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }
}

/// Comment on a post. Owned by its parent post, never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
}

/// Partial update of a post's content fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
}

/// Validate and trim a post title: non-empty, at most [`TITLE_MAX_CHARS`] characters.
pub fn validate_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::Validation("title must not be empty".to_string()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::Validation(format!(
            "title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

/// Validate post content: non-empty after trimming.
pub fn validate_content(content: &str) -> Result<String, DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::Validation("content must not be empty".to_string()));
    }
    Ok(content.to_string())
}

/// Normalize a tag list: trim, lowercase, drop empties, dedupe keeping the
/// first occurrence's position.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_post_starts_with_zero_counters() {
        let post = Post::new(
            Uuid::new_v4(),
            "hello".to_string(),
            "Hello".to_string(),
            "<p>hi</p>".to_string(),
            vec![],
            None,
        );

        assert_eq!(post.view_count, 0);
        assert_eq!(post.like_count, 0);
        assert_eq!(post.comment_count, 0);
        assert!(post.likes.is_empty());
        assert!(post.comments.is_empty());
    }

    #[test]
    fn validate_title_rejects_empty_and_overlong() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(201)).is_err());
        assert_eq!(validate_title(&"x".repeat(200)).unwrap().len(), 200);
        assert_eq!(validate_title("  Hello  ").unwrap(), "Hello");
    }

    #[test]
    fn validate_content_rejects_whitespace_only() {
        assert!(validate_content(" \n\t ").is_err());
        assert!(validate_content("<p>body</p>").is_ok());
    }

    #[test]
    fn tags_are_lowercased_and_deduplicated_in_order() {
        let tags = normalize_tags(vec![
            "Rust".to_string(),
            " Web ".to_string(),
            "rust".to_string(),
            "".to_string(),
        ]);
        assert_eq!(tags, vec!["rust".to_string(), "web".to_string()]);
    }
}
