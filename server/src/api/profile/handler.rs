//! Profile Handlers
//!
//! The profile form edits identity fields (username, names, email) and
//! profile fields (RFC, contact number) together. RFC is stored
//! uppercased, email lowercased.

use axum::{Json, extract::State};
use serde::Serialize;
use surrealdb::RecordId;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Profile, ProfileUpdate, User, UserIdentityUpdate, UserInfo};
use crate::utils::{AppResult, now_millis};
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, validate_phone, validate_required_text, validate_tax_id,
};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserInfo,
    pub tax_id: Option<String>,
    pub contact_number: Option<String>,
    pub is_complete: bool,
    pub is_subscribed: bool,
    pub has_active_subscription: bool,
}

#[derive(Debug, Serialize)]
pub struct CompletenessResponse {
    pub complete: bool,
}

fn user_record(current_user: &CurrentUser) -> AppResult<RecordId> {
    current_user
        .id
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed user id in token"))
}

async fn load(state: &ServerState, current_user: &CurrentUser) -> AppResult<(User, Profile)> {
    let user = state
        .users()
        .find_by_id(&current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let user_id = user_record(current_user)?;
    let profile = state
        .profiles()
        .find_by_user(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;
    Ok((user, profile))
}

fn response(user: &User, profile: &Profile) -> ProfileResponse {
    ProfileResponse {
        user: UserInfo::from(user),
        tax_id: profile.tax_id.clone(),
        contact_number: profile.contact_number.clone(),
        is_complete: profile.is_complete(user),
        is_subscribed: profile.is_subscribed,
        has_active_subscription: profile.has_active_subscription(now_millis()),
    }
}

pub async fn get_profile(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<ProfileResponse>> {
    let (user, profile) = load(&state, &current_user).await?;
    Ok(Json(response(&user, &profile)))
}

/// Update identity and profile fields in one call. Uniqueness of
/// username/email/RFC is checked excluding the caller.
pub async fn update_profile(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(req): Json<ProfileUpdate>,
) -> AppResult<Json<ProfileResponse>> {
    validate_required_text(&req.username, "username", MAX_NAME_LEN)?;
    validate_required_text(&req.first_name, "first name", MAX_NAME_LEN)?;
    validate_required_text(&req.last_name, "last name", MAX_NAME_LEN)?;
    validate_required_text(&req.email, "email", MAX_EMAIL_LEN)?;
    if !req.email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }

    let tax_id = req
        .tax_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase);
    if let Some(ref rfc) = tax_id {
        validate_tax_id(rfc)?;
    }

    let contact_number = req
        .contact_number
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    if let Some(ref phone) = contact_number {
        validate_phone(phone)?;
    }

    let user = state
        .users()
        .update_identity(
            &current_user.id,
            UserIdentityUpdate {
                username: req.username.trim().to_string(),
                first_name: req.first_name.trim().to_string(),
                last_name: req.last_name.trim().to_string(),
                email: req.email.trim().to_lowercase(),
            },
        )
        .await?;

    let user_id = user_record(&current_user)?;
    let profile = state
        .profiles()
        .update_details(&user_id, tax_id, contact_number)
        .await?;

    tracing::info!(user_id = %current_user.id, "Profile updated");
    Ok(Json(response(&user, &profile)))
}

/// Completeness probe used by the frontend for post-login routing.
pub async fn completeness(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<CompletenessResponse>> {
    let (user, profile) = load(&state, &current_user).await?;
    Ok(Json(CompletenessResponse {
        complete: profile.is_complete(&user),
    }))
}
