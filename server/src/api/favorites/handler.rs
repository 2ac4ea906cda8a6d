//! Favorite Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use surrealdb::RecordId;

use crate::AppError;
use crate::api::view::{ListingSummary, summarize};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub liked: bool,
}

fn user_record(current_user: &CurrentUser) -> AppResult<RecordId> {
    current_user
        .id
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed user id in token"))
}

/// Toggle a favorite; returns the new state.
pub async fn toggle(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ToggleResponse>> {
    let listing = state
        .listings()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found"))?;
    let listing_id = listing
        .id
        .ok_or_else(|| AppError::database("Listing without id"))?;

    let user = user_record(&current_user)?;
    let liked = state.favorites().toggle(&user, &listing_id).await?;

    Ok(Json(ToggleResponse { liked }))
}

/// The user's favorite listings, most recently favorited first.
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ListingSummary>>> {
    let user = user_record(&current_user)?;
    let listings = state.favorites().listings_for_user(&user).await?;
    Ok(Json(summarize(&state.photos(), listings).await?))
}
