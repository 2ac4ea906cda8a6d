//! Authentication middleware
//!
//! Axum middleware enforcing JWT authentication on the API surface.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;

/// Routes reachable without a token.
///
/// - health probe
/// - register / login
/// - public listing search, listing detail and stored media
/// - payment provider webhook (signature-guarded instead)
fn is_public_route(method: &http::Method, path: &str) -> bool {
    if path == "/api/health"
        || path == "/api/search"
        || path == "/api/billing/webhook"
        || path.starts_with("/api/auth/")
        || path.starts_with("/api/media/")
    {
        return true;
    }
    // GET /api/listings/{id} is public; everything else under /api/listings
    // (create, edit, panel, favorites) requires auth.
    if *method == http::Method::GET
        && let Some(rest) = path.strip_prefix("/api/listings/")
        && rest != "mine"
        && !rest.contains('/')
    {
        return true;
    }
    false
}

/// Authentication middleware - requires a logged-in user
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>`,
/// then injects [`CurrentUser`] into request extensions.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // Allow CORS preflight
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API routes fall through to a normal 404
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_route(req.method(), path) {
        // Still decode a token when one is present, so public handlers can
        // distinguish the owner of a listing from anonymous visitors.
        if let Some(header) = req
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            && let Some(token) = JwtService::extract_from_header(header)
            && let Ok(claims) = state.jwt_service.validate_token(token)
        {
            req.extensions_mut().insert(CurrentUser::from(claims));
        }
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::warn!(target: "security", uri = %req.uri(), "Request without credentials");
            return Err(AppError::unauthorized());
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            req.extensions_mut().insert(CurrentUser::from(claims));
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(target: "security", error = %e, uri = %req.uri(), "Token validation failed");
            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn public_route_matrix() {
        assert!(is_public_route(&Method::GET, "/api/health"));
        assert!(is_public_route(&Method::GET, "/api/search"));
        assert!(is_public_route(&Method::POST, "/api/auth/login"));
        assert!(is_public_route(&Method::POST, "/api/billing/webhook"));
        assert!(is_public_route(&Method::GET, "/api/listings/listing:abc"));
        assert!(is_public_route(&Method::GET, "/api/media/abc123.jpg"));

        assert!(!is_public_route(&Method::GET, "/api/listings/mine"));
        assert!(!is_public_route(&Method::POST, "/api/listings"));
        assert!(!is_public_route(
            &Method::POST,
            "/api/listings/listing:abc/favorite"
        ));
        assert!(!is_public_route(&Method::GET, "/api/profile"));
        assert!(!is_public_route(&Method::POST, "/api/billing/checkout-session"));
    }
}
