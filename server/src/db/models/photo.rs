//! Photo Model
//!
//! Photos belong to a listing and carry a display order plus a cover
//! flag. Exactly one photo per non-empty set is the cover; ordering and
//! cover selection are normalized on write, not trusted from clients.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Photo ID type
pub type PhotoId = RecordId;

/// Photo record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<PhotoId>,
    /// Owning listing
    #[serde(with = "serde_helpers::record_id")]
    pub listing: RecordId,
    /// Stored image path or URL
    pub image: String,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_cover: bool,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default)]
    pub uploaded_at: i64,
}

/// Photo as submitted with a listing create/update
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoInput {
    pub image: String,
    #[serde(default)]
    pub is_cover: bool,
    #[serde(default)]
    pub display_order: u32,
}

/// Pick the index of the photo that should be the cover.
///
/// Photos are considered in (display_order, id) order. The first photo
/// flagged as cover wins; if none is flagged, the first photo is
/// promoted. Returns `None` for an empty set.
pub fn select_cover(photos: &[Photo]) -> Option<usize> {
    if photos.is_empty() {
        return None;
    }

    let mut order: Vec<usize> = (0..photos.len()).collect();
    order.sort_by(|&a, &b| {
        let ka = (photos[a].display_order, photos[a].id.as_ref().map(|r| r.to_string()));
        let kb = (photos[b].display_order, photos[b].id.as_ref().map(|r| r.to_string()));
        ka.cmp(&kb)
    });

    order
        .iter()
        .copied()
        .find(|&i| photos[i].is_cover)
        .or_else(|| order.first().copied())
}
