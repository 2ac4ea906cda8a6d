//! Shared API view types.
//!
//! Listing cards carry their cover image; the detail view carries the
//! full photo set plus the viewer's favorite state.

use serde::Serialize;

use crate::db::models::{Listing, Photo};
use crate::db::repository::PhotoRepository;
use crate::utils::{AppError, AppResult};

/// Listing card for search/panel/favorites lists
#[derive(Debug, Serialize)]
pub struct ListingSummary {
    #[serde(flatten)]
    pub listing: Listing,
    pub cover: Option<String>,
}

/// Full listing detail
#[derive(Debug, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub photos: Vec<Photo>,
    pub is_favorite: bool,
}

/// Attach cover images to a page of listings.
pub async fn summarize(
    photos: &PhotoRepository,
    listings: Vec<Listing>,
) -> AppResult<Vec<ListingSummary>> {
    let mut summaries = Vec::with_capacity(listings.len());
    for listing in listings {
        let id = listing
            .id
            .clone()
            .ok_or_else(|| AppError::database("Listing without id"))?;
        let cover = photos
            .find_by_listing(&id)
            .await?
            .into_iter()
            .find(|p| p.is_cover)
            .map(|p| p.image);
        summaries.push(ListingSummary { listing, cover });
    }
    Ok(summaries)
}
