//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use portal_core::domain::User;
use portal_core::error::ValidationErrors;
use portal_core::ports::{PasswordService, TokenService};
use portal_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

fn token_response(token_service: &dyn TokenService, user: &User) -> AppResult<AuthResponse> {
    let token = token_service
        .generate_token(user.id, &user.username, &user.email)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds().max(0) as u64,
    })
}

fn validate_registration(req: &RegisterUserRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if req.username.trim().is_empty() {
        errors.add_field("username", "This field is required.");
    }
    if req.email.is_empty() || !req.email.contains('@') {
        errors.add_field("email", "Enter a valid email address.");
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add_field(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
    errors.into_result(())
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validate_registration(&req)?;

    let username = req.username.trim().to_string();
    if state.repos.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }
    if state.repos.users.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = state
        .repos
        .users
        .save(User::new(username, req.email, password_hash))
        .await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(token_response(token_service.get_ref().as_ref(), &user)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .repos
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::debug!(user_id = %user.id, "Rejected login");
        return Err(AppError::Unauthorized);
    }

    Ok(HttpResponse::Ok().json(token_response(token_service.get_ref().as_ref(), &user)?))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .repos
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        created_at: user.created_at,
    }))
}
