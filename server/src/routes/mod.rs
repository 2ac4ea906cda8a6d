//! Route assembly and tower-http middleware stack.

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::auth::require_auth;
use crate::core::ServerState;

pub mod router_ext;
pub use router_ext::{OneshotResult, OneshotRouter};

/// Request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// All routes, no middleware and no state applied.
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(api::health::router())
        .merge(api::auth::router())
        .merge(api::search::router())
        .merge(api::listings::router())
        .merge(api::favorites::router())
        .merge(api::profile::router())
        .merge(api::billing::router())
        .merge(api::upload::router())
}

/// Fully configured application with middleware and state.
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::core::Config;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use serde_json::{Value, json};

    fn test_config() -> Config {
        Config {
            work_dir: "./test-data".to_string(),
            http_port: 0,
            jwt: JwtConfig {
                secret: "routes-test-secret-key-long-enough-000".to_string(),
                expiration_minutes: 60,
                issuer: "vivienda-server".to_string(),
                audience: "vivienda-web".to_string(),
            },
            environment: "development".to_string(),
            billing_secret_key: "sk_test_x".to_string(),
            billing_webhook_secret: "whsec_test".to_string(),
            // Closed port so accidental provider calls fail fast
            billing_api_base: "http://127.0.0.1:1".to_string(),
            price_id_weekly: "price_w".to_string(),
            price_id_monthly: "price_m".to_string(),
            price_id_yearly: "price_y".to_string(),
            checkout_success_url: "http://localhost/success".to_string(),
            checkout_cancel_url: "http://localhost/cancel".to_string(),
        }
    }

    async fn setup() -> (ServerState, Router<ServerState>) {
        let state = ServerState::for_tests(test_config()).await.unwrap();
        let router = build_router().layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));
        (state, router)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: http::Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register(
        state: &ServerState,
        router: &mut Router<ServerState>,
        username: &str,
    ) -> String {
        let response = router
            .oneshot(
                state,
                json_request(
                    "POST",
                    "/api/auth/register",
                    None,
                    json!({
                        "username": username,
                        "password": "secret-pass-123",
                        "email": format!("{username}@example.com"),
                        "first_name": "Ana",
                        "last_name": "Lopez",
                    }),
                ),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        body["token"].as_str().unwrap().to_string()
    }

    fn listing_body() -> Value {
        json!({
            "title": "Casa en el centro",
            "description": "Amplia y luminosa",
            "price": "1500000",
            "operation": "sale",
            "bedrooms": 3,
            "bathrooms": 2.5,
            "parking": 2,
            "built_area": 180,
            "lot_area": 200,
            "financing": "either",
            "street": "Av. Universidad",
            "number": "123",
            "neighborhood": "Centro",
            "city": "Chihuahua",
            "state": "Chihuahua",
            "postal_code": "31000",
            "latitude": 28.63,
            "longitude": -106.07,
            "photos": [
                {"image": "/api/media/a.jpg", "display_order": 1},
                {"image": "/api/media/b.jpg", "display_order": 2, "is_cover": true}
            ]
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let (state, mut router) = setup().await;
        let response = router
            .oneshot(&state, get_request("/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let (state, mut router) = setup().await;
        let response = router
            .oneshot(&state, get_request("/api/profile", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_login_and_me() {
        let (state, mut router) = setup().await;
        let _token = register(&state, &mut router, "carlos").await;

        let response = router
            .oneshot(
                &state,
                json_request(
                    "POST",
                    "/api/auth/login",
                    None,
                    json!({"username": "carlos", "password": "secret-pass-123"}),
                ),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let token = body["token"].as_str().unwrap().to_string();

        let response = router
            .oneshot(&state, get_request("/api/auth/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let me = body_json(response).await;
        assert_eq!(me["username"], "carlos");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_with_unified_message() {
        let (state, mut router) = setup().await;
        register(&state, &mut router, "carlos").await;

        let response = router
            .oneshot(
                &state,
                json_request(
                    "POST",
                    "/api/auth/login",
                    None,
                    json!({"username": "carlos", "password": "wrong-password"}),
                ),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router
            .oneshot(
                &state,
                json_request(
                    "POST",
                    "/api/auth/login",
                    None,
                    json!({"username": "nobody", "password": "wrong-password"}),
                ),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn listing_lifecycle_and_search() {
        let (state, mut router) = setup().await;
        let token = register(&state, &mut router, "vendedora").await;

        // Create
        let response = router
            .oneshot(
                &state,
                json_request("POST", "/api/listings", Some(&token), listing_body()),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        let id = created["id"].as_str().unwrap().to_string();
        // Cover flag respected
        let covers: Vec<&Value> = created["photos"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|p| p["is_cover"] == json!(true))
            .collect();
        assert_eq!(covers.len(), 1);
        assert_eq!(covers[0]["image"], "/api/media/b.jpg");

        // Public search finds it
        let response = router
            .oneshot(&state, get_request("/api/search?q=casa+chihuahua", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_json(response).await;
        assert_eq!(page["total_count"], 1);
        assert_eq!(page["listings"][0]["cover"], "/api/media/b.jpg");

        // Close it; search no longer returns it
        let response = router
            .oneshot(
                &state,
                json_request(
                    "POST",
                    &format!("/api/listings/{id}/status"),
                    Some(&token),
                    json!({"status": "closed"}),
                ),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(&state, get_request("/api/search", None))
            .await
            .unwrap();
        let page = body_json(response).await;
        assert_eq!(page["total_count"], 0);

        // Anonymous detail now 404s, owner still sees it
        let response = router
            .oneshot(&state, get_request(&format!("/api/listings/{id}"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router
            .oneshot(
                &state,
                get_request(&format!("/api/listings/{id}"), Some(&token)),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Panel shows it under closed
        let response = router
            .oneshot(&state, get_request("/api/listings/mine", Some(&token)))
            .await
            .unwrap();
        let panel = body_json(response).await;
        assert_eq!(panel["counts"]["closed"], 1);
        assert_eq!(panel["counts"]["available"], 0);
    }

    #[tokio::test]
    async fn non_owner_cannot_mutate() {
        let (state, mut router) = setup().await;
        let owner_token = register(&state, &mut router, "owner").await;
        let other_token = register(&state, &mut router, "other").await;

        let response = router
            .oneshot(
                &state,
                json_request("POST", "/api/listings", Some(&owner_token), listing_body()),
            )
            .await
            .unwrap();
        let created = body_json(response).await;
        let id = created["id"].as_str().unwrap().to_string();

        let response = router
            .oneshot(
                &state,
                json_request(
                    "PUT",
                    &format!("/api/listings/{id}"),
                    Some(&other_token),
                    json!({"title": "Hijacked"}),
                ),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let mut delete_req = Request::builder()
            .method("DELETE")
            .uri(format!("/api/listings/{id}"));
        delete_req = delete_req.header(
            http::header::AUTHORIZATION,
            format!("Bearer {other_token}"),
        );
        let response = router
            .oneshot(&state, delete_req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn favorite_toggle_and_list() {
        let (state, mut router) = setup().await;
        let owner_token = register(&state, &mut router, "owner").await;
        let fan_token = register(&state, &mut router, "fan").await;

        let response = router
            .oneshot(
                &state,
                json_request("POST", "/api/listings", Some(&owner_token), listing_body()),
            )
            .await
            .unwrap();
        let created = body_json(response).await;
        let id = created["id"].as_str().unwrap().to_string();

        let uri = format!("/api/listings/{id}/favorite");
        let response = router
            .oneshot(
                &state,
                json_request("POST", &uri, Some(&fan_token), json!({})),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["liked"], true);

        let response = router
            .oneshot(&state, get_request("/api/favorites", Some(&fan_token)))
            .await
            .unwrap();
        let favorites = body_json(response).await;
        assert_eq!(favorites.as_array().unwrap().len(), 1);

        let response = router
            .oneshot(
                &state,
                json_request("POST", &uri, Some(&fan_token), json!({})),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["liked"], false);

        let response = router
            .oneshot(&state, get_request("/api/favorites", Some(&fan_token)))
            .await
            .unwrap();
        let favorites = body_json(response).await;
        assert!(favorites.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn profile_completion_flow() {
        let (state, mut router) = setup().await;
        let token = register(&state, &mut router, "carlos").await;

        let response = router
            .oneshot(&state, get_request("/api/profile/complete", Some(&token)))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["complete"], false);

        let response = router
            .oneshot(
                &state,
                json_request(
                    "PUT",
                    "/api/profile",
                    Some(&token),
                    json!({
                        "username": "carlos",
                        "first_name": "Carlos",
                        "last_name": "Dominguez",
                        "email": "Carlos@Example.com",
                        "tax_id": "gode561231gr8",
                        "contact_number": "6561234567",
                    }),
                ),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        // RFC uppercased, email lowercased
        assert_eq!(body["tax_id"], "GODE561231GR8");
        assert_eq!(body["user"]["email"], "carlos@example.com");
        assert_eq!(body["is_complete"], true);

        let response = router
            .oneshot(&state, get_request("/api/profile/complete", Some(&token)))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["complete"], true);
    }

    #[tokio::test]
    async fn webhook_rejects_bad_signature() {
        let (state, mut router) = setup().await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/billing/webhook")
            .header("stripe-signature", "t=0,v1=deadbeef")
            .body(Body::from(r#"{"type":"checkout.session.completed"}"#))
            .unwrap();
        let response = router.oneshot(&state, request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = Request::builder()
            .method("POST")
            .uri("/api/billing/webhook")
            .body(Body::from("{}"))
            .unwrap();
        let response = router.oneshot(&state, request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_accepts_signed_unknown_event() {
        use ring::hmac;

        let (state, mut router) = setup().await;

        let payload = r#"{"type":"charge.refunded","data":{"object":{"id":"ch_1"}}}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let key = hmac::Key::new(hmac::HMAC_SHA256, b"test");
        let tag = hmac::sign(&key, format!("{timestamp}.{payload}").as_bytes());
        let header = format!("t={timestamp},v1={}", hex::encode(tag.as_ref()));

        let request = Request::builder()
            .method("POST")
            .uri("/api/billing/webhook")
            .header("stripe-signature", header)
            .body(Body::from(payload))
            .unwrap();
        let response = router.oneshot(&state, request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
