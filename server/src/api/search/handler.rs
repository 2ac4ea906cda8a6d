//! Search Handler

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;

use crate::api::view::{ListingSummary, summarize};
use crate::core::ServerState;
use crate::search::{SearchParams, run_search};
use crate::utils::AppResult;

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub listings: Vec<ListingSummary>,
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

/// Public search over available listings. All parameters are optional
/// and parsed leniently.
pub async fn search(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let available = state.listings().find_available().await?;
    let page = run_search(available, &params);

    let listings = summarize(&state.photos(), page.listings).await?;

    Ok(Json(SearchResponse {
        listings,
        page: page.page,
        total_pages: page.total_pages,
        total_count: page.total_count,
    }))
}
