//! Billing Routes
//!
//! Checkout/portal require auth; the webhook is public and guarded by
//! its signature instead.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/billing/checkout-session", post(handler::checkout_session))
        .route("/api/billing/portal-session", post(handler::portal_session))
        .route("/api/billing/webhook", post(handler::webhook))
}
