//! Public user endpoints: profiles and per-author post listings.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_shared::dto::{ListPostsQuery, UserProfileResponse};

use crate::handlers::posts::{page_response, to_query};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/users/{id}
pub async fn get_user(state: web::Data<AppState>, id: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(*id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{id}'")))?;

    Ok(HttpResponse::Ok().json(UserProfileResponse {
        id: user.id,
        username: user.username,
        bio: user.bio,
        created_at: user.created_at,
    }))
}

/// GET /api/users/{id}/posts
pub async fn get_user_posts(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let mut query = to_query(query.into_inner());
    query.author = Some(*id);

    let page = state.posts.list_posts(query).await?;

    Ok(HttpResponse::Ok().json(page_response(page)))
}
