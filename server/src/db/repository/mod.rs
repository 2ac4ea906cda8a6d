//! Repository Module
//!
//! CRUD operations over the embedded SurrealDB tables. Uniqueness rules
//! (username, email, tax id, one favorite per user+listing) are enforced
//! here with lookups before writes.

pub mod favorite;
pub mod listing;
pub mod photo;
pub mod profile;
pub mod user;

pub use favorite::FavoriteRepository;
pub use listing::ListingRepository;
pub use photo::PhotoRepository;
pub use profile::ProfileRepository;
pub use user::UserRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Parse a "table:id" string into a RecordId
pub fn parse_record_id(id: &str) -> RepoResult<RecordId> {
    id.parse()
        .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
