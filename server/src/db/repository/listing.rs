//! Listing Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Listing, ListingCreate, ListingStatus, ListingUpdate};
use crate::utils::now_millis;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct ListingRepository {
    base: BaseRepository,
}

impl ListingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All publicly visible listings, newest first. The search pipeline
    /// narrows this set in memory.
    pub async fn find_available(&self) -> RepoResult<Vec<Listing>> {
        let listings: Vec<Listing> = self
            .base
            .db()
            .query("SELECT * FROM listing WHERE status = 'available' ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(listings)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Listing>> {
        let thing = parse_record_id(id)?;
        let listing: Option<Listing> = self.base.db().select(thing).await?;
        Ok(listing)
    }

    /// All listings for one owner regardless of status, newest first.
    pub async fn find_by_owner(&self, owner: &RecordId) -> RepoResult<Vec<Listing>> {
        // Link fields are stored in "table:id" string form
        let owner = owner.to_string();
        let listings: Vec<Listing> = self
            .base
            .db()
            .query("SELECT * FROM listing WHERE owner = $owner ORDER BY created_at DESC")
            .bind(("owner", owner))
            .await?
            .take(0)?;
        Ok(listings)
    }

    pub async fn create(&self, owner: RecordId, data: ListingCreate) -> RepoResult<Listing> {
        let now = now_millis();
        let listing = Listing {
            id: None,
            owner,
            title: data.title,
            description: data.description,
            price: data.price,
            operation: data.operation,
            bedrooms: data.bedrooms,
            bathrooms: data.bathrooms,
            parking: data.parking,
            built_area: data.built_area,
            lot_area: data.lot_area,
            financing: data.financing,
            street: data.street,
            number: data.number,
            neighborhood: data.neighborhood,
            city: data.city,
            state: data.state,
            postal_code: data.postal_code,
            latitude: data.latitude,
            longitude: data.longitude,
            status: ListingStatus::Available,
            created_at: now,
            updated_at: now,
        };

        let mut result = self
            .base
            .db()
            .query("CREATE listing CONTENT $listing RETURN AFTER")
            .bind(("listing", listing))
            .await?;

        let created: Option<Listing> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create listing".to_string()))
    }

    /// Merge the present fields of `data` into the record and bump
    /// `updated_at`.
    pub async fn update(&self, id: &str, data: ListingUpdate) -> RepoResult<Listing> {
        let thing = parse_record_id(id)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Listing {} not found", id)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing MERGE $data;
                   UPDATE $thing SET updated_at = $updated_at RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("data", data))
            .bind(("updated_at", now_millis()))
            .await?;

        result
            .take::<Option<Listing>>(1)?
            .ok_or_else(|| RepoError::NotFound(format!("Listing {} not found", id)))
    }

    pub async fn set_status(&self, id: &str, status: ListingStatus) -> RepoResult<Listing> {
        let thing = parse_record_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    status = $status,
                    updated_at = $updated_at
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("status", status))
            .bind(("updated_at", now_millis()))
            .await?;

        result
            .take::<Option<Listing>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Listing {} not found", id)))
    }

    /// Hard delete a listing and its dependents (photos, favorites).
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Listing {} not found", id)))?;

        self.base
            .db()
            .query(
                r#"DELETE photo WHERE listing = $listing;
                   DELETE favorite WHERE listing = $listing;
                   DELETE $thing"#,
            )
            .bind(("listing", thing.to_string()))
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{FinancingType, OperationType};
    use rust_decimal::Decimal;

    pub(crate) fn listing_create(title: &str, city: &str) -> ListingCreate {
        ListingCreate {
            title: title.to_string(),
            description: String::new(),
            price: Decimal::new(1_200_000, 0),
            operation: OperationType::Sale,
            bedrooms: 3,
            bathrooms: 2.0,
            parking: 1,
            built_area: 120,
            lot_area: 150,
            financing: FinancingType::Either,
            street: "Calle 5".to_string(),
            number: "10".to_string(),
            neighborhood: "Centro".to_string(),
            city: city.to_string(),
            state: "Chihuahua".to_string(),
            postal_code: "31000".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test]
    async fn available_excludes_other_statuses() {
        let db = DbService::new_memory().await.unwrap();
        let repo = ListingRepository::new(db.db.clone());
        let owner: RecordId = "user:ana".parse().unwrap();

        let a = repo
            .create(owner.clone(), listing_create("Casa uno", "Chihuahua"))
            .await
            .unwrap();
        repo.create(owner.clone(), listing_create("Casa dos", "Juarez"))
            .await
            .unwrap();

        repo.set_status(&a.id.unwrap().to_string(), ListingStatus::Closed)
            .await
            .unwrap();

        let available = repo.find_available().await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].title, "Casa dos");
    }

    #[tokio::test]
    async fn update_merges_present_fields_only() {
        let db = DbService::new_memory().await.unwrap();
        let repo = ListingRepository::new(db.db.clone());
        let owner: RecordId = "user:ana".parse().unwrap();

        let listing = repo
            .create(owner, listing_create("Casa uno", "Chihuahua"))
            .await
            .unwrap();
        let id = listing.id.unwrap().to_string();

        let updated = repo
            .update(
                &id,
                ListingUpdate {
                    title: Some("Casa remodelada".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Casa remodelada");
        assert_eq!(updated.city, "Chihuahua");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn delete_unknown_listing_is_not_found() {
        let db = DbService::new_memory().await.unwrap();
        let repo = ListingRepository::new(db.db.clone());
        let err = repo.delete("listing:missing").await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
