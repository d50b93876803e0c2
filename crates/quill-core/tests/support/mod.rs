//! In-memory `PostRepository` double for exercising the services.
//!
//! A single mutex guards the store, so every operation is trivially atomic
//! per post, matching the contract of the storage-level primitives.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use quill_core::domain::{Comment, Post};
use quill_core::error::RepoError;
use quill_core::ports::{PostPage, PostQuery, PostRepository, PostSort};

#[derive(Default)]
pub struct MemoryPostRepository {
    posts: Mutex<HashMap<Uuid, Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the stored copy of a post, bypassing the view counter.
    pub fn stored(&self, id: Uuid) -> Option<Post> {
        self.posts.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        if posts.values().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint("duplicate slug".to_string()));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .values()
            .any(|p| p.slug == slug && Some(p.id) != exclude))
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let stored = posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;

        stored.slug = post.slug;
        stored.title = post.title;
        stored.content = post.content;
        stored.tags = post.tags;
        stored.featured_image = post.featured_image;
        stored.updated_at = post.updated_at;

        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn list(&self, query: &PostQuery) -> Result<PostPage, RepoError> {
        let posts = self.posts.lock().unwrap();

        let mut matching: Vec<Post> = posts
            .values()
            .filter(|p| {
                query.search.as_deref().is_none_or(|s| {
                    p.title.contains(s) || p.content.contains(s)
                })
            })
            .filter(|p| query.author.is_none_or(|a| p.author_id == a))
            .filter(|p| query.tag.as_deref().is_none_or(|t| p.tags.iter().any(|x| x == t)))
            .cloned()
            .collect();

        match query.sort {
            PostSort::Newest => matching.sort_by(|a, b| {
                b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id))
            }),
            PostSort::Oldest => matching.sort_by(|a, b| {
                a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
            }),
        }

        let total_posts = matching.len() as u64;
        let total_pages = total_posts.div_ceil(query.page_size);
        let start = ((query.page - 1) * query.page_size) as usize;
        let page: Vec<Post> = matching
            .into_iter()
            .skip(start)
            .take(query.page_size as usize)
            .collect();

        Ok(PostPage {
            posts: page,
            current_page: query.page,
            total_pages,
            total_posts,
            has_next: query.page < total_pages,
            has_prev: query.page > 1,
        })
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let stored = posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        stored.view_count += 1;
        Ok(())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Post, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let stored = posts.get_mut(&post_id).ok_or(RepoError::NotFound)?;

        if let Some(pos) = stored.likes.iter().position(|id| *id == user_id) {
            stored.likes.remove(pos);
        } else {
            stored.likes.push(user_id);
        }
        stored.like_count = stored.likes.len() as i64;

        Ok(stored.clone())
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Post, RepoError> {
        let mut posts = self.posts.lock().unwrap();
        let stored = posts.get_mut(&post_id).ok_or(RepoError::NotFound)?;

        stored.comments.push(Comment {
            author_id,
            content: content.to_string(),
            created_at: at,
        });
        stored.comment_count = stored.comments.len() as i64;

        Ok(stored.clone())
    }
}
