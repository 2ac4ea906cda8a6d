//! Profile Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Profile, SubscriptionPatch};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct ProfileRepository {
    base: BaseRepository,
}

impl ProfileRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create the profile row for a freshly registered user.
    pub async fn create_for_user(&self, user: RecordId) -> RepoResult<Profile> {
        if self.find_by_user(&user).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Profile for user {} already exists",
                user
            )));
        }

        let profile = Profile::new(user);
        let mut result = self
            .base
            .db()
            .query("CREATE profile CONTENT $profile RETURN AFTER")
            .bind(("profile", profile))
            .await?;

        let created: Option<Profile> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create profile".to_string()))
    }

    pub async fn find_by_user(&self, user: &RecordId) -> RepoResult<Option<Profile>> {
        // Link fields are stored in "table:id" string form
        let user = user.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM profile WHERE user = $user LIMIT 1")
            .bind(("user", user))
            .await?;
        let profiles: Vec<Profile> = result.take(0)?;
        Ok(profiles.into_iter().next())
    }

    /// Find the profile carrying a given provider subscription id.
    pub async fn find_by_subscription(&self, subscription_id: &str) -> RepoResult<Option<Profile>> {
        let sub = subscription_id.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM profile WHERE subscription_id = $sub LIMIT 1")
            .bind(("sub", sub))
            .await?;
        let profiles: Vec<Profile> = result.take(0)?;
        Ok(profiles.into_iter().next())
    }

    async fn find_by_tax_id(&self, tax_id: &str) -> RepoResult<Option<Profile>> {
        let tax_id = tax_id.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM profile WHERE tax_id = $tax_id LIMIT 1")
            .bind(("tax_id", tax_id))
            .await?;
        let profiles: Vec<Profile> = result.take(0)?;
        Ok(profiles.into_iter().next())
    }

    /// Update the user-editable profile details. The tax id stays unique
    /// across other profiles.
    pub async fn update_details(
        &self,
        user: &RecordId,
        tax_id: Option<String>,
        contact_number: Option<String>,
    ) -> RepoResult<Profile> {
        let existing = self
            .find_by_user(user)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Profile for user {} not found", user)))?;

        if let Some(ref new_tax_id) = tax_id
            && existing.tax_id.as_deref() != Some(new_tax_id.as_str())
            && let Some(other) = self.find_by_tax_id(new_tax_id).await?
            && other.user != *user
        {
            return Err(RepoError::Duplicate(format!(
                "Tax id '{}' already registered",
                new_tax_id
            )));
        }

        let thing = existing
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Profile without id".to_string()))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    tax_id = $tax_id,
                    contact_number = $contact_number
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("tax_id", tax_id))
            .bind(("contact_number", contact_number))
            .await?;

        result
            .take::<Option<Profile>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Profile for user {} not found", user)))
    }

    /// Overwrite subscription fields from a reconciliation event. Fields
    /// absent from the patch keep their stored value.
    pub async fn apply_subscription(
        &self,
        profile_id: &RecordId,
        patch: SubscriptionPatch,
    ) -> RepoResult<Profile> {
        let thing = profile_id.clone();
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing MERGE $patch RETURN AFTER")
            .bind(("thing", thing))
            .bind(("patch", patch))
            .await?;

        result
            .take::<Option<Profile>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Profile {} not found", profile_id)))
    }
}
