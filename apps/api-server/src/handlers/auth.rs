//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use quill_core::domain::User;
use quill_core::ports::{PasswordService, TokenService};
use quill_shared::dto::{
    AuthResponse, LoginRequest, RegisterUserRequest, UpdateProfileRequest, UserResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    let username = req.username.trim();
    if username.is_empty() || username.len() > 30 {
        return Err(AppError::BadRequest(
            "Username must be between 1 and 30 characters".to_string(),
        ));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Check if user already exists
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }
    if state.users.find_by_username(username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    // Hash password
    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Create user
    let user = User::new(username.to_string(), req.email, password_hash);
    let saved_user = state.users.insert(user).await?;

    // Generate token
    let token = token_service
        .generate_token(saved_user.id, &saved_user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Find user by email
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Verify password
    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }

    // Generate token
    let token = token_service
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("account no longer exists".to_string()))?;

    Ok(HttpResponse::Ok().json(user_response(user)))
}

/// PUT /api/auth/profile - Protected route
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("account no longer exists".to_string()))?;

    if let Some(username) = req.username {
        let username = username.trim().to_string();
        if username.is_empty() || username.len() > 30 {
            return Err(AppError::BadRequest(
                "Username must be between 1 and 30 characters".to_string(),
            ));
        }
        if username != user.username
            && state.users.find_by_username(&username).await?.is_some()
        {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
        user.username = username;
    }
    if let Some(bio) = req.bio {
        user.bio = Some(bio);
    }
    user.updated_at = chrono::Utc::now();

    let saved = state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(user_response(saved)))
}

fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        bio: user.bio,
        created_at: user.created_at,
    }
}
