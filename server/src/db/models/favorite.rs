//! Favorite Model
//!
//! One row per (user, listing) pair; toggled on and off by the user.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Favorite ID type
pub type FavoriteId = RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<FavoriteId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub listing: RecordId,
    #[serde(default)]
    pub created_at: i64,
}
