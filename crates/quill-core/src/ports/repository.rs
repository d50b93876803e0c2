use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, User};
use crate::error::RepoError;

/// Filter and paging parameters for listing posts.
#[derive(Debug, Clone)]
pub struct PostQuery {
    /// 1-based page number.
    pub page: u64,
    pub page_size: u64,
    /// Free-text search over title and content.
    pub search: Option<String>,
    pub author: Option<Uuid>,
    pub tag: Option<String>,
    pub sort: PostSort,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            search: None,
            author: None,
            tag: None,
            sort: PostSort::Newest,
        }
    }
}

/// Ordering for post listings. Creation time descending unless overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
}

/// One page of a post listing plus paging metadata.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_posts: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Post repository.
///
/// `toggle_like` and `add_comment` are the storage-level atomic primitives:
/// each mutates the backing collection and recomputes the denormalized
/// counter in a single transaction, so concurrent interactions on the same
/// post serialize at the storage layer. Mutations on different posts are
/// independent.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Whether a slug is taken, optionally ignoring one post (its current owner).
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError>;

    /// Persist the post's content fields. Counters and collections are
    /// untouched; they only change through the interaction primitives.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    async fn list(&self, query: &PostQuery) -> Result<PostPage, RepoError>;

    /// Bump the view counter by one. Callers treat failures as non-fatal.
    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError>;

    /// Flip the user's membership in the post's like set and recompute
    /// `like_count` in the same commit. This is a toggle, not a set-membership
    /// assertion: retrying a timed-out call flips the state again.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Post, RepoError>;

    /// Append a comment and recompute `comment_count` in the same commit.
    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Post, RepoError>;
}

/// User repository.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn insert(&self, user: User) -> Result<User, RepoError>;

    async fn update(&self, user: User) -> Result<User, RepoError>;
}
