//! Photo Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Photo, PhotoInput, select_cover};
use crate::utils::now_millis;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct PhotoRepository {
    base: BaseRepository,
}

impl PhotoRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Photos of a listing in (display_order, id) order.
    pub async fn find_by_listing(&self, listing: &RecordId) -> RepoResult<Vec<Photo>> {
        // Link fields are stored in "table:id" string form
        let listing = listing.to_string();
        let photos: Vec<Photo> = self
            .base
            .db()
            .query("SELECT * FROM photo WHERE listing = $listing ORDER BY display_order, id")
            .bind(("listing", listing))
            .await?
            .take(0)?;
        Ok(photos)
    }

    /// Replace the full photo set of a listing, then normalize the cover.
    pub async fn replace_for_listing(
        &self,
        listing: &RecordId,
        inputs: Vec<PhotoInput>,
    ) -> RepoResult<Vec<Photo>> {
        self.base
            .db()
            .query("DELETE photo WHERE listing = $listing")
            .bind(("listing", listing.to_string()))
            .await?;

        let now = now_millis();
        for input in inputs {
            let photo = Photo {
                id: None,
                listing: listing.clone(),
                image: input.image,
                is_cover: input.is_cover,
                display_order: input.display_order,
                uploaded_at: now,
            };
            let _created: Option<Photo> = self
                .base
                .db()
                .query("CREATE photo CONTENT $photo RETURN AFTER")
                .bind(("photo", photo))
                .await?
                .take(0)?;
        }

        self.normalize_cover(listing).await
    }

    /// Enforce the cover rule: exactly one cover for a non-empty set.
    /// The first flagged photo in display order wins; with none flagged
    /// the first photo is promoted.
    pub async fn normalize_cover(&self, listing: &RecordId) -> RepoResult<Vec<Photo>> {
        let photos = self.find_by_listing(listing).await?;
        let cover_idx = select_cover(&photos);

        for (i, photo) in photos.iter().enumerate() {
            let want_cover = Some(i) == cover_idx;
            if photo.is_cover != want_cover {
                let thing = photo
                    .id
                    .clone()
                    .ok_or_else(|| RepoError::Database("Photo without id".to_string()))?;
                self.base
                    .db()
                    .query("UPDATE $thing SET is_cover = $is_cover")
                    .bind(("thing", thing))
                    .bind(("is_cover", want_cover))
                    .await?;
            }
        }

        self.find_by_listing(listing).await
    }
}
