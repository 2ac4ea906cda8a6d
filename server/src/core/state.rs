//! Server State
//!
//! Shared references handed to every handler. Cloning is shallow; the
//! database handle and the Arc-wrapped services are reference counted.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::billing::BillingClient;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    FavoriteRepository, ListingRepository, PhotoRepository, ProfileRepository, UserRepository,
};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub billing: Arc<BillingClient>,
}

impl ServerState {
    /// Open the database and wire up all services.
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;
        std::fs::create_dir_all(config.media_dir())
            .map_err(|e| AppError::internal(format!("Failed to create media dir: {e}")))?;

        let db_service = DbService::new(&config.db_path()).await?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let billing = Arc::new(BillingClient::new(
            config.billing_secret_key.clone(),
            config.billing_api_base.clone(),
        ));

        Ok(Self {
            config: config.clone(),
            db: db_service.db,
            jwt_service,
            billing,
        })
    }

    /// In-memory variant for handler tests.
    #[cfg(test)]
    pub async fn for_tests(config: Config) -> AppResult<Self> {
        let db_service = DbService::new_memory().await?;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let billing = Arc::new(BillingClient::new(
            config.billing_secret_key.clone(),
            config.billing_api_base.clone(),
        ));
        Ok(Self {
            config,
            db: db_service.db,
            jwt_service,
            billing,
        })
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    pub fn profiles(&self) -> ProfileRepository {
        ProfileRepository::new(self.db.clone())
    }

    pub fn listings(&self) -> ListingRepository {
        ListingRepository::new(self.db.clone())
    }

    pub fn photos(&self) -> PhotoRepository {
        PhotoRepository::new(self.db.clone())
    }

    pub fn favorites(&self) -> FavoriteRepository {
        FavoriteRepository::new(self.db.clone())
    }
}
