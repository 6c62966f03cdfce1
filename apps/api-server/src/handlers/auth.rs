//! Registration and login handlers.

use actix_web::{HttpResponse, web};

use todolist_core::domain::NewUser;
use todolist_core::error::RepoError;
use todolist_core::ports::AuthError;
use todolist_shared::dto::{LoginRequest, RegisterRequest};
use todolist_shared::{MessageResponse, TokenResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate().inspect_err(|e| {
        tracing::error!(reason = %e, "Invalid register request");
    })?;

    let password_hash = state.passwords.hash(&req.password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        AppError::Internal("an error occurred".to_string())
    })?;

    let new_user = NewUser::new(req.username, req.email, password_hash);
    match state.users.create_user(new_user).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "user created successfully");
            Ok(HttpResponse::Ok().json(MessageResponse::new(200, "user created successfully")))
        }
        Err(RepoError::AlreadyExists(detail)) => {
            tracing::warn!(%detail, "user already exists");
            Err(AppError::Conflict("user already exists".to_string()))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create user");
            Err(AppError::Internal("failed to create user".to_string()))
        }
    }
}

/// POST /login
///
/// An unknown email and a wrong password produce the same 401.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate().inspect_err(|e| {
        tracing::error!(reason = %e, "Invalid login request");
    })?;

    let user = state
        .users
        .find_user_by_email(&req.email)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "User lookup failed");
            AppError::Internal("an error occurred".to_string())
        })?
        .ok_or_else(|| AppError::Unauthorized(AuthError::InvalidCredentials.to_string()))?;

    let valid = state
        .passwords
        .verify(&req.password, &user.password_hash)
        .unwrap_or_else(|e| {
            tracing::error!(user_id = user.id, error = %e, "Stored password hash is unreadable");
            false
        });
    if !valid {
        return Err(AppError::Unauthorized(AuthError::InvalidCredentials.to_string()));
    }

    let token = state
        .tokens
        .generate_token(&user.email, &user.username)
        .map_err(|e| {
            tracing::error!(error = %e, "Token signing failed");
            AppError::Internal("Failed to create token".to_string())
        })?;

    tracing::info!(
        user_id = user.id,
        expires_in = state.tokens.expiration_seconds(),
        "user logged in"
    );
    Ok(HttpResponse::Ok().json(TokenResponse {
        status: 200,
        message: format!("hello {}! you are now logged in", user.username),
        token,
    }))
}
