//! Vivienda Server - real-estate classifieds backend
//!
//! # Module structure
//!
//! ```text
//! server/src/
//! ├── core/      # configuration, state, HTTP server
//! ├── auth/      # JWT auth, middleware, extractors
//! ├── api/       # HTTP routes and handlers
//! ├── routes/    # router assembly and middleware stack
//! ├── db/        # embedded SurrealDB models and repositories
//! ├── search/    # listing search and filter pipeline
//! ├── billing/   # payment provider client, webhook, reconciliation
//! └── utils/     # errors, logging, validation
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod routes;
pub mod search;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};
