//! Authentication - JWT tokens, middleware and the current-user extractor

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use extractor::MaybeUser;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;

/// Authenticated user injected into request extensions by [`require_auth`]
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Record id in "user:xxxx" form
    pub id: String,
    pub username: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
        }
    }
}
