//! Post handlers: lifecycle, listing, likes, and comments.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{NewPost, Post, PostPatch};
use quill_core::ports::{PostPage, PostQuery, PostSort};
use quill_shared::dto::{
    AddCommentRequest, CommentResponse, CreatePostRequest, ListPostsQuery, MessageResponse,
    PaginationMeta, PostEnvelope, PostListResponse, PostResponse, UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let page = state.posts.list_posts(to_query(query.into_inner())).await?;

    Ok(HttpResponse::Ok().json(page_response(page)))
}

/// POST /api/posts - Protected route
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = NewPost {
        title: req.title,
        content: req.content,
        tags: req.tags,
        featured_image: req.featured_image,
    };

    let post = state
        .posts
        .create_post(Some(identity.user_id), input)
        .await?;

    Ok(HttpResponse::Created().json(PostEnvelope {
        post: post_response(post),
    }))
}

/// GET /api/posts/{key} - key is a slug or an id. Counts a view.
pub async fn get_post(
    state: web::Data<AppState>,
    key: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get_post(&key).await?;

    Ok(HttpResponse::Ok().json(PostEnvelope {
        post: post_response(post),
    }))
}

/// PUT /api/posts/{id} - Protected route, author only
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let patch = PostPatch {
        title: req.title,
        content: req.content,
        tags: req.tags,
        featured_image: req.featured_image,
    };

    let post = state
        .posts
        .update_post(*id, Some(identity.user_id), patch)
        .await?;

    Ok(HttpResponse::Ok().json(PostEnvelope {
        post: post_response(post),
    }))
}

/// DELETE /api/posts/{id} - Protected route, author only
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete_post(*id, Some(identity.user_id))
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "post deleted".to_string(),
    }))
}

/// POST /api/posts/{id}/like - Protected route
pub async fn toggle_like(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .interactions
        .toggle_like(*id, Some(identity.user_id))
        .await?;

    Ok(HttpResponse::Ok().json(PostEnvelope {
        post: post_response(post),
    }))
}

/// POST /api/posts/{id}/comments - Protected route
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    id: web::Path<Uuid>,
    body: web::Json<AddCommentRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .interactions
        .add_comment(*id, Some(identity.user_id), &body.content)
        .await?;

    Ok(HttpResponse::Created().json(PostEnvelope {
        post: post_response(post),
    }))
}

pub(crate) fn to_query(q: ListPostsQuery) -> PostQuery {
    PostQuery {
        page: q.page.unwrap_or(1),
        page_size: q.limit.unwrap_or(10),
        search: q.search,
        author: q.author,
        tag: q.tag,
        sort: match q.sort.as_deref() {
            Some("oldest") => PostSort::Oldest,
            _ => PostSort::Newest,
        },
    }
}

pub(crate) fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        slug: post.slug,
        author_id: post.author_id,
        title: post.title,
        content: post.content,
        tags: post.tags,
        featured_image: post.featured_image,
        view_count: post.view_count,
        like_count: post.like_count,
        comment_count: post.comment_count,
        likes: post.likes,
        comments: post
            .comments
            .into_iter()
            .map(|c| CommentResponse {
                author_id: c.author_id,
                content: c.content,
                created_at: c.created_at,
            })
            .collect(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub(crate) fn page_response(page: PostPage) -> PostListResponse {
    PostListResponse {
        posts: page.posts.into_iter().map(post_response).collect(),
        pagination: PaginationMeta {
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_posts: page.total_posts,
            has_next: page.has_next,
            has_prev: page.has_prev,
        },
    }
}
