//! Favorite Repository

use super::{BaseRepository, RepoResult};
use crate::db::models::{Favorite, Listing};
use crate::utils::now_millis;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct FavoriteRepository {
    base: BaseRepository,
}

impl FavoriteRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn find(&self, user: &RecordId, listing: &RecordId) -> RepoResult<Option<Favorite>> {
        // Link fields are stored in "table:id" string form
        let user = user.to_string();
        let listing = listing.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM favorite WHERE user = $user AND listing = $listing LIMIT 1")
            .bind(("user", user))
            .bind(("listing", listing))
            .await?;
        let favorites: Vec<Favorite> = result.take(0)?;
        Ok(favorites.into_iter().next())
    }

    /// Flip the favorite state for (user, listing). Returns the new
    /// state: true when the pair is now favorited.
    pub async fn toggle(&self, user: &RecordId, listing: &RecordId) -> RepoResult<bool> {
        if let Some(existing) = self.find(user, listing).await? {
            if let Some(thing) = existing.id {
                self.base
                    .db()
                    .query("DELETE $thing")
                    .bind(("thing", thing))
                    .await?;
            }
            return Ok(false);
        }

        let favorite = Favorite {
            id: None,
            user: user.clone(),
            listing: listing.clone(),
            created_at: now_millis(),
        };
        let _created: Option<Favorite> = self
            .base
            .db()
            .query("CREATE favorite CONTENT $favorite RETURN AFTER")
            .bind(("favorite", favorite))
            .await?
            .take(0)?;
        Ok(true)
    }

    pub async fn is_favorited(&self, user: &RecordId, listing: &RecordId) -> RepoResult<bool> {
        Ok(self.find(user, listing).await?.is_some())
    }

    /// Listings the user has favorited, most recently favorited first.
    /// Listings deleted since favoriting are skipped.
    pub async fn listings_for_user(&self, user: &RecordId) -> RepoResult<Vec<Listing>> {
        let user = user.to_string();
        let favorites: Vec<Favorite> = self
            .base
            .db()
            .query("SELECT * FROM favorite WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user))
            .await?
            .take(0)?;

        let mut listings = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            let listing: Option<Listing> = self.base.db().select(favorite.listing).await?;
            if let Some(listing) = listing {
                listings.push(listing);
            }
        }
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn toggle_twice_returns_to_initial_state() {
        let db = DbService::new_memory().await.unwrap();
        let repo = FavoriteRepository::new(db.db.clone());
        let user: RecordId = "user:ana".parse().unwrap();
        let listing: RecordId = "listing:one".parse().unwrap();

        assert!(!repo.is_favorited(&user, &listing).await.unwrap());
        assert!(repo.toggle(&user, &listing).await.unwrap());
        assert!(repo.is_favorited(&user, &listing).await.unwrap());
        assert!(!repo.toggle(&user, &listing).await.unwrap());
        assert!(!repo.is_favorited(&user, &listing).await.unwrap());
    }

    #[tokio::test]
    async fn favorites_are_per_user() {
        let db = DbService::new_memory().await.unwrap();
        let repo = FavoriteRepository::new(db.db.clone());
        let ana: RecordId = "user:ana".parse().unwrap();
        let beto: RecordId = "user:beto".parse().unwrap();
        let listing: RecordId = "listing:one".parse().unwrap();

        repo.toggle(&ana, &listing).await.unwrap();
        assert!(!repo.is_favorited(&beto, &listing).await.unwrap());
    }
}
