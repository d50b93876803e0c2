//! Data Transfer Objects - request/response types for the API.
//!
//! Field names serialize in camelCase; the shapes match what the single-page
//! frontend consumes (`{post}` and `{posts, pagination}` envelopes, counter
//! fields alongside the collections they summarize).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request to update the authenticated user's profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub bio: Option<String>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Response containing the authenticated user's own information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public profile of a user, as shown on author pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
}

/// Partial update of a post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
}

/// Request to comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
}

/// Query parameters for listing posts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub author: Option<Uuid>,
    pub tag: Option<String>,
    pub sort: Option<String>,
}

/// A comment as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A post as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub slug: String,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `{post}` envelope returned by single-post endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEnvelope {
    pub post: PostResponse,
}

/// Paging metadata for post listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_posts: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// `{posts, pagination}` envelope returned by listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub pagination: PaginationMeta,
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_meta_serializes_camel_case() {
        let meta = PaginationMeta {
            current_page: 2,
            total_pages: 5,
            total_posts: 42,
            has_next: true,
            has_prev: true,
        };

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["totalPosts"], 42);
        assert_eq!(json["hasNext"], true);
    }

    #[test]
    fn create_post_request_defaults_tags() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"title":"T","content":"C"}"#).unwrap();
        assert!(req.tags.is_empty());
        assert!(req.featured_image.is_none());
    }
}
