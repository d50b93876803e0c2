use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::authz;
use crate::domain::{NewPost, Post, PostPatch, normalize_tags, validate_content, validate_title};
use crate::error::DomainError;
use crate::ports::{PostPage, PostQuery, PostRepository};
use crate::slug::{SLUG_SUFFIX_LIMIT, slugify};

/// Largest allowed page size for listings.
pub const MAX_PAGE_SIZE: u64 = 50;

/// Post store: lifecycle and retrieval of posts.
///
/// Owns slug derivation, field validation, and the author-only mutation
/// rules. Counter maintenance for likes and comments lives in the
/// interaction engine.
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Create a post for an authenticated author.
    ///
    /// Validates title and content, normalizes tags, and derives a unique
    /// slug from the title (numeric suffix on collision).
    pub async fn create_post(
        &self,
        actor: Option<Uuid>,
        input: NewPost,
    ) -> Result<Post, DomainError> {
        let author_id = authz::require_actor(actor)?;

        let title = validate_title(&input.title)?;
        let content = validate_content(&input.content)?;
        let tags = normalize_tags(input.tags);
        let slug = self.unique_slug(&slugify(&title), None).await?;

        let post = Post::new(author_id, slug, title, content, tags, input.featured_image);
        tracing::debug!(post_id = %post.id, slug = %post.slug, "creating post");

        Ok(self.repo.insert(post).await?)
    }

    /// Fetch a post by slug or id for display.
    ///
    /// Counts the view: the increment is best-effort and a failure to persist
    /// it never fails the read.
    pub async fn get_post(&self, key: &str) -> Result<Post, DomainError> {
        let mut post = self
            .find_by_key(key)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post '{key}'")))?;

        match self.repo.increment_views(post.id).await {
            Ok(()) => post.view_count += 1,
            Err(err) => {
                tracing::warn!(post_id = %post.id, error = %err, "view count increment failed");
            }
        }

        Ok(post)
    }

    /// Apply a patch to the post's content fields. Author-only.
    ///
    /// The slug is re-derived only when a changed title produces a different
    /// slug; otherwise existing links keep working.
    pub async fn update_post(
        &self,
        post_id: Uuid,
        actor: Option<Uuid>,
        patch: PostPatch,
    ) -> Result<Post, DomainError> {
        let mut post = self.load(post_id).await?;
        if !authz::can_mutate(&post, actor) {
            return Err(mutation_denied(actor));
        }

        if let Some(title) = patch.title {
            let title = validate_title(&title)?;
            if title != post.title {
                let base = slugify(&title);
                if base != post.slug {
                    post.slug = self.unique_slug(&base, Some(post.id)).await?;
                }
                post.title = title;
            }
        }
        if let Some(content) = patch.content {
            post.content = validate_content(&content)?;
        }
        if let Some(tags) = patch.tags {
            post.tags = normalize_tags(tags);
        }
        if let Some(image) = patch.featured_image {
            post.featured_image = Some(image);
        }
        post.updated_at = Utc::now();

        Ok(self.repo.update(post).await?)
    }

    /// Hard-delete a post. Author-only; comments and likes go with it.
    pub async fn delete_post(&self, post_id: Uuid, actor: Option<Uuid>) -> Result<(), DomainError> {
        let post = self.load(post_id).await?;
        if !authz::can_mutate(&post, actor) {
            return Err(mutation_denied(actor));
        }

        tracing::debug!(post_id = %post.id, slug = %post.slug, "deleting post");
        Ok(self.repo.delete(post.id).await?)
    }

    /// List posts with search, author, and tag filters.
    pub async fn list_posts(&self, mut query: PostQuery) -> Result<PostPage, DomainError> {
        query.page = query.page.max(1);
        query.page_size = query.page_size.clamp(1, MAX_PAGE_SIZE);
        if query.search.as_deref().is_some_and(|s| s.trim().is_empty()) {
            query.search = None;
        }
        if let Some(tag) = query.tag.take() {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() {
                query.tag = Some(tag);
            }
        }

        Ok(self.repo.list(&query).await?)
    }

    /// Load a post by id without counting a view (edit and delete paths).
    async fn load(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.repo
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post '{post_id}'")))
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<Post>, DomainError> {
        match Uuid::parse_str(key) {
            Ok(id) => Ok(self.repo.find_by_id(id).await?),
            Err(_) => Ok(self.repo.find_by_slug(key).await?),
        }
    }

    /// Resolve `base` to a free slug, appending `-1`, `-2`, ... on collision.
    /// `exclude` ignores the post's own current slug during updates.
    async fn unique_slug(
        &self,
        base: &str,
        exclude: Option<Uuid>,
    ) -> Result<String, DomainError> {
        if !self.repo.slug_exists(base, exclude).await? {
            return Ok(base.to_string());
        }
        for suffix in 1..=SLUG_SUFFIX_LIMIT {
            let candidate = format!("{base}-{suffix}");
            if !self.repo.slug_exists(&candidate, exclude).await? {
                return Ok(candidate);
            }
        }
        Err(DomainError::Conflict(format!(
            "could not find a free slug for '{base}'"
        )))
    }
}

/// Map a failed `can_mutate` check to the right rejection: absent actors are
/// unauthenticated, present ones are not the author.
pub(crate) fn mutation_denied(actor: Option<Uuid>) -> DomainError {
    if actor.is_none() {
        DomainError::Unauthorized
    } else {
        DomainError::Forbidden
    }
}
