//! Authentication Handlers
//!
//! Registration, login and token introspection.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{SubscriptionPatch, UserCreate, UserInfo};
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_required_text,
};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

fn validate_registration(req: &UserCreate) -> AppResult<()> {
    validate_required_text(&req.username, "username", MAX_NAME_LEN)?;
    validate_required_text(&req.email, "email", MAX_EMAIL_LEN)?;
    if !req.email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if req.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation("Password is too long"));
    }
    Ok(())
}

/// Register handler
///
/// Creates the user, its profile row, and a provider customer. The
/// provider call is best-effort: an outage never blocks registration.
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<UserCreate>,
) -> AppResult<Json<AuthResponse>> {
    validate_registration(&req)?;

    let user = state.users().create(req).await?;
    let user_id = user
        .id
        .clone()
        .ok_or_else(|| AppError::database("User without id"))?;

    let profile = state.profiles().create_for_user(user_id.clone()).await?;

    // Create the provider customer up front so checkout can reuse it.
    let full_name = format!("{} {}", user.first_name, user.last_name);
    match state
        .billing
        .create_customer(&user.email, full_name.trim())
        .await
    {
        Ok(customer) => {
            if let Some(profile_id) = profile.id.as_ref() {
                let patch = SubscriptionPatch {
                    customer_id: Some(customer.id),
                    ..Default::default()
                };
                if let Err(e) = state.profiles().apply_subscription(profile_id, patch).await {
                    tracing::error!(error = %e, "Failed to store provider customer id");
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, user = %user.username, "Provider customer creation failed, continuing");
        }
    }

    let token = state
        .jwt_service
        .generate_token(&user_id.to_string(), &user.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = %user_id, username = %user.username, "User registered");

    Ok(Json(AuthResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

/// Login handler
///
/// Verifies credentials and returns a JWT. Failures use a unified
/// message and a fixed delay so usernames cannot be enumerated.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = state.users().find_by_username(&req.username).await?;

    // Fixed delay before checking the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let user = match user {
        Some(u) => u,
        None => {
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let password_valid = user
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !password_valid {
        tracing::warn!(username = %req.username, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    let user_id = user
        .id
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_default();

    let token = state
        .jwt_service
        .generate_token(&user_id, &user.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = %user_id, username = %user.username, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

/// Current user info
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserInfo>> {
    let user = state
        .users()
        .find_by_id(&current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(UserInfo::from(&user)))
}
