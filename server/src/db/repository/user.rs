//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{User, UserCreate, UserIdentityUpdate};
use crate::utils::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = parse_record_id(id)?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find user by username (exact)
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let username_owned = username.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by email (stored lowercased)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_lowercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already exists",
                data.email
            )));
        }

        let password_hash = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    username = $username,
                    first_name = $first_name,
                    last_name = $last_name,
                    email = $email,
                    password_hash = $password_hash,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("username", data.username))
            .bind(("first_name", data.first_name))
            .bind(("last_name", data.last_name))
            .bind(("email", data.email.to_lowercase()))
            .bind(("password_hash", password_hash))
            .bind(("created_at", now_millis()))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update the identity fields, keeping username and email unique
    /// across other users.
    pub async fn update_identity(&self, id: &str, data: UserIdentityUpdate) -> RepoResult<User> {
        let thing = parse_record_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;

        if data.username != existing.username
            && self.find_by_username(&data.username).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }

        let email = data.email.to_lowercase();
        if email != existing.email && self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already exists",
                email
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    username = $username,
                    first_name = $first_name,
                    last_name = $last_name,
                    email = $email
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("username", data.username))
            .bind(("first_name", data.first_name))
            .bind(("last_name", data.last_name))
            .bind(("email", email))
            .await?;

        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn user_create(username: &str, email: &str) -> UserCreate {
        UserCreate {
            username: username.to_string(),
            password: "secret123".to_string(),
            email: email.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_username_and_email() {
        let db = DbService::new_memory().await.unwrap();
        let repo = UserRepository::new(db.db.clone());

        repo.create(user_create("ana", "ana@example.com"))
            .await
            .unwrap();

        let err = repo
            .create(user_create("ana", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let err = repo
            .create(user_create("other", "ANA@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn update_identity_allows_keeping_own_values() {
        let db = DbService::new_memory().await.unwrap();
        let repo = UserRepository::new(db.db.clone());

        let user = repo
            .create(user_create("ana", "ana@example.com"))
            .await
            .unwrap();
        let id = user.id.as_ref().unwrap().to_string();

        let updated = repo
            .update_identity(
                &id,
                UserIdentityUpdate {
                    username: "ana".to_string(),
                    first_name: "Ana Maria".to_string(),
                    last_name: "Lopez".to_string(),
                    email: "ana@example.com".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Ana Maria");
    }
}
