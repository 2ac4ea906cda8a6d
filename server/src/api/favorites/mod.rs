//! Favorite Routes

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/listings/{id}/favorite", post(handler::toggle))
        .route("/api/favorites", get(handler::list))
}
