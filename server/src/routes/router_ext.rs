//! Router extension for oneshot calls
//!
//! Lets tests drive the full router, middleware included, without
//! binding a socket.

use anyhow::Result;
use axum::Router;
use axum::body::Body;
use http::{Request, Response};
use tower::Service;

use crate::core::ServerState;

/// Result type for oneshot API calls
pub type OneshotResult = Result<Response<Body>>;

#[async_trait::async_trait]
pub trait OneshotRouter {
    async fn oneshot(&mut self, state: &ServerState, request: Request<Body>) -> OneshotResult;
}

#[async_trait::async_trait]
impl OneshotRouter for Router<ServerState> {
    async fn oneshot(&mut self, state: &ServerState, request: Request<Body>) -> OneshotResult {
        let mut svc = self.clone().with_state(state.clone());
        let response = svc.call(request).await?;
        Ok(response)
    }
}
