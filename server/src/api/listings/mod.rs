//! Listing Routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/listings | POST | yes |
//! | /api/listings/mine | GET | yes |
//! | /api/listings/{id} | GET | no (owner sees any status) |
//! | /api/listings/{id} | PUT | yes, owner |
//! | /api/listings/{id}/status | POST | yes, owner |
//! | /api/listings/{id} | DELETE | yes, owner |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/listings", post(handler::create))
        .route("/api/listings/mine", get(handler::mine))
        .route(
            "/api/listings/{id}",
            get(handler::detail)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/api/listings/{id}/status", post(handler::set_status))
}
