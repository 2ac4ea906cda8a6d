//! Listing Handlers
//!
//! Create/edit/status/delete are owner-scoped; the detail view is
//! public for available listings and owner-only otherwise.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::AppError;
use crate::api::view::{ListingDetail, ListingSummary, summarize};
use crate::auth::{CurrentUser, extractor::MaybeUser};
use crate::core::ServerState;
use crate::db::models::{
    Listing, ListingCreate, ListingStatus, ListingUpdate, OperationType, PhotoInput,
};
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_ADDRESS_PART_LEN, MAX_DESCRIPTION_LEN, MAX_HOUSE_NUMBER_LEN, MAX_IMAGE_LEN, MAX_TITLE_LEN,
    validate_coordinates, validate_optional_text, validate_postal_code, validate_required_text,
};

/// Owner panel page size
const PANEL_PAGE_SIZE: usize = 9;

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    #[serde(flatten)]
    pub listing: ListingCreate,
    #[serde(default)]
    pub photos: Vec<PhotoInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListingRequest {
    #[serde(flatten)]
    pub listing: ListingUpdate,
    /// When present, replaces the full photo set
    pub photos: Option<Vec<PhotoInput>>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PanelParams {
    pub status: Option<String>,
    pub operation: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusCounts {
    pub available: usize,
    pub in_negotiation: usize,
    pub closed: usize,
}

#[derive(Debug, Serialize)]
pub struct PanelPage {
    pub listings: Vec<ListingSummary>,
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub counts: StatusCounts,
}

fn validate_create(data: &ListingCreate) -> AppResult<()> {
    validate_required_text(&data.title, "title", MAX_TITLE_LEN)?;
    if data.description.len() > MAX_DESCRIPTION_LEN {
        return Err(AppError::validation("Description is too long"));
    }
    if data.price <= Decimal::ZERO {
        return Err(AppError::validation("Price must be positive"));
    }
    if data.bathrooms < 0.0 {
        return Err(AppError::validation("Bathrooms must not be negative"));
    }
    validate_required_text(&data.street, "street", MAX_ADDRESS_PART_LEN)?;
    if data.number.len() > MAX_HOUSE_NUMBER_LEN {
        return Err(AppError::validation("House number is too long"));
    }
    validate_required_text(&data.neighborhood, "neighborhood", MAX_ADDRESS_PART_LEN)?;
    validate_required_text(&data.city, "city", MAX_ADDRESS_PART_LEN)?;
    validate_required_text(&data.state, "state", MAX_ADDRESS_PART_LEN)?;
    validate_postal_code(&data.postal_code)?;
    validate_location(data.latitude, data.longitude)?;
    Ok(())
}

/// Every listing carries map coordinates; a submission without the
/// marker placed is rejected.
fn validate_location(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<()> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => validate_coordinates(lat, lon),
        _ => Err(AppError::validation(
            "Place the marker on the map: latitude and longitude are required",
        )),
    }
}

/// A listing always keeps at least one photo.
fn validate_photos(photos: &[PhotoInput]) -> AppResult<()> {
    if photos.is_empty() {
        return Err(AppError::validation("At least one photo is required"));
    }
    for photo in photos {
        validate_required_text(&photo.image, "photo image", MAX_IMAGE_LEN)?;
    }
    Ok(())
}

fn owner_id(current_user: &CurrentUser) -> AppResult<RecordId> {
    current_user
        .id
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed user id in token"))
}

/// 404 for both "does not exist" and "not yours", so listing ids cannot
/// be probed.
fn check_owner(listing: &Listing, current_user: &CurrentUser) -> AppResult<()> {
    if listing.owner.to_string() != current_user.id {
        return Err(AppError::not_found("Listing not found"));
    }
    Ok(())
}

async fn detail_view(
    state: &ServerState,
    listing: Listing,
    viewer: Option<&CurrentUser>,
) -> AppResult<ListingDetail> {
    let id = listing
        .id
        .clone()
        .ok_or_else(|| AppError::database("Listing without id"))?;
    let photos = state.photos().find_by_listing(&id).await?;

    let is_favorite = match viewer {
        Some(user) => {
            let user_id = owner_id(user)?;
            state.favorites().is_favorited(&user_id, &id).await?
        }
        None => false,
    };

    Ok(ListingDetail {
        listing,
        photos,
        is_favorite,
    })
}

/// Create listing
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(req): Json<CreateListingRequest>,
) -> AppResult<Json<ListingDetail>> {
    validate_create(&req.listing)?;
    validate_photos(&req.photos)?;

    let owner = owner_id(&current_user)?;
    let listing = state.listings().create(owner, req.listing).await?;
    let listing_id = listing
        .id
        .clone()
        .ok_or_else(|| AppError::database("Listing without id"))?;

    state
        .photos()
        .replace_for_listing(&listing_id, req.photos)
        .await?;

    tracing::info!(listing_id = %listing_id, user = %current_user.username, "Listing created");

    let listing = state
        .listings()
        .find_by_id(&listing_id.to_string())
        .await?
        .ok_or_else(|| AppError::database("Listing vanished after create"))?;
    Ok(Json(detail_view(&state, listing, Some(&current_user)).await?))
}

/// Listing detail; non-available listings are visible to their owner only.
pub async fn detail(
    State(state): State<ServerState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> AppResult<Json<ListingDetail>> {
    let listing = state
        .listings()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found"))?;

    if listing.status != ListingStatus::Available {
        let is_owner = viewer
            .as_ref()
            .is_some_and(|u| u.id == listing.owner.to_string());
        if !is_owner {
            return Err(AppError::not_found("Listing not found"));
        }
    }

    Ok(Json(detail_view(&state, listing, viewer.as_ref()).await?))
}

fn validate_update(data: &ListingUpdate) -> AppResult<()> {
    if let Some(ref title) = data.title {
        validate_required_text(title, "title", MAX_TITLE_LEN)?;
    }
    validate_optional_text(&data.description, "description", MAX_DESCRIPTION_LEN)?;
    if let Some(price) = data.price
        && price <= Decimal::ZERO
    {
        return Err(AppError::validation("Price must be positive"));
    }
    if let Some(bathrooms) = data.bathrooms
        && bathrooms < 0.0
    {
        return Err(AppError::validation("Bathrooms must not be negative"));
    }
    if let Some(ref street) = data.street {
        validate_required_text(street, "street", MAX_ADDRESS_PART_LEN)?;
    }
    if let Some(ref neighborhood) = data.neighborhood {
        validate_required_text(neighborhood, "neighborhood", MAX_ADDRESS_PART_LEN)?;
    }
    if let Some(ref city) = data.city {
        validate_required_text(city, "city", MAX_ADDRESS_PART_LEN)?;
    }
    if let Some(ref st) = data.state {
        validate_required_text(st, "state", MAX_ADDRESS_PART_LEN)?;
    }
    if let Some(ref postal) = data.postal_code {
        validate_postal_code(postal)?;
    }
    Ok(())
}

/// Update listing (owner only)
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateListingRequest>,
) -> AppResult<Json<ListingDetail>> {
    let existing = state
        .listings()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found"))?;
    check_owner(&existing, &current_user)?;

    validate_update(&req.listing)?;
    // Merged coordinates must still form a valid pair
    let latitude = req.listing.latitude.or(existing.latitude);
    let longitude = req.listing.longitude.or(existing.longitude);
    validate_location(latitude, longitude)?;

    if let Some(ref photos) = req.photos {
        validate_photos(photos)?;
    }

    let listing = state.listings().update(&id, req.listing).await?;

    if let Some(photos) = req.photos {
        let listing_id = listing
            .id
            .clone()
            .ok_or_else(|| AppError::database("Listing without id"))?;
        state
            .photos()
            .replace_for_listing(&listing_id, photos)
            .await?;
    }

    Ok(Json(detail_view(&state, listing, Some(&current_user)).await?))
}

/// Change listing status (owner only)
pub async fn set_status(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> AppResult<Json<ListingDetail>> {
    let status = ListingStatus::parse_param(&req.status).ok_or_else(|| {
        AppError::validation("Status must be one of: available, in_negotiation, closed")
    })?;

    let existing = state
        .listings()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found"))?;
    check_owner(&existing, &current_user)?;

    let listing = state.listings().set_status(&id, status).await?;
    tracing::info!(listing_id = %id, status = %req.status, "Listing status changed");
    Ok(Json(detail_view(&state, listing, Some(&current_user)).await?))
}

/// Delete listing with its photos and favorites (owner only)
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let existing = state
        .listings()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found"))?;
    check_owner(&existing, &current_user)?;

    state.listings().delete(&id).await?;
    tracing::info!(listing_id = %id, user = %current_user.username, "Listing deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Owner panel: the user's own listings with quick filters, per-status
/// counts and 9-per-page pagination.
pub async fn mine(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Query(params): Query<PanelParams>,
) -> AppResult<Json<PanelPage>> {
    let owner = owner_id(&current_user)?;
    let all = state.listings().find_by_owner(&owner).await?;

    let counts = StatusCounts {
        available: count_status(&all, ListingStatus::Available),
        in_negotiation: count_status(&all, ListingStatus::InNegotiation),
        closed: count_status(&all, ListingStatus::Closed),
    };

    // Quick filters parse leniently like search parameters
    let status = params.status.as_deref().and_then(ListingStatus::parse_param);
    let operation = params
        .operation
        .as_deref()
        .and_then(OperationType::parse_param);

    let filtered: Vec<Listing> = all
        .into_iter()
        .filter(|l| status.is_none_or(|s| l.status == s))
        .filter(|l| operation.is_none_or(|o| l.operation == o))
        .collect();

    let total_count = filtered.len();
    let total_pages = total_count.div_ceil(PANEL_PAGE_SIZE).max(1);
    let page = params
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, total_pages);

    let page_items: Vec<Listing> = filtered
        .into_iter()
        .skip((page - 1) * PANEL_PAGE_SIZE)
        .take(PANEL_PAGE_SIZE)
        .collect();

    let listings = summarize(&state.photos(), page_items).await?;

    Ok(Json(PanelPage {
        listings,
        page,
        total_pages,
        total_count,
        counts,
    }))
}

fn count_status(listings: &[Listing], status: ListingStatus) -> usize {
    listings.iter().filter(|l| l.status == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::FinancingType;

    fn create_data() -> ListingCreate {
        ListingCreate {
            title: "Casa en venta".to_string(),
            description: String::new(),
            price: Decimal::new(1_500_000, 0),
            operation: OperationType::Sale,
            bedrooms: 3,
            bathrooms: 2.0,
            parking: 1,
            built_area: 120,
            lot_area: 150,
            financing: FinancingType::Either,
            street: "Av. Universidad".to_string(),
            number: "123".to_string(),
            neighborhood: "Centro".to_string(),
            city: "Chihuahua".to_string(),
            state: "Chihuahua".to_string(),
            postal_code: "31000".to_string(),
            latitude: Some(28.63),
            longitude: Some(-106.07),
        }
    }

    #[test]
    fn create_requires_both_coordinates() {
        assert!(validate_create(&create_data()).is_ok());

        let mut data = create_data();
        data.latitude = None;
        data.longitude = None;
        assert!(validate_create(&data).is_err());

        let mut data = create_data();
        data.longitude = None;
        assert!(validate_create(&data).is_err());
    }

    #[test]
    fn photo_set_must_never_be_empty() {
        assert!(validate_photos(&[]).is_err());

        let photos = vec![PhotoInput {
            image: "/api/media/a.jpg".to_string(),
            is_cover: true,
            display_order: 1,
        }];
        assert!(validate_photos(&photos).is_ok());
    }
}
