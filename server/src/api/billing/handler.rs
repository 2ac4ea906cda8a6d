//! Billing Handlers

use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::billing::{Plan, WebhookEvent, reconcile, verify_signature};
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// weekly | monthly | yearly; anything else falls back to monthly
    #[serde(default)]
    pub plan: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PortalRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub url: String,
}

/// Start a subscription checkout for the current user.
pub async fn checkout_session(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<UrlResponse>> {
    let plan = Plan::parse(req.plan.as_deref().unwrap_or(""));
    let price_id = state.config.price_id_for(plan).to_string();
    if price_id.is_empty() {
        return Err(AppError::internal(format!(
            "No price configured for plan {}",
            plan.as_str()
        )));
    }

    let user_id: RecordId = current_user
        .id
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed user id in token"))?;
    let profile = state
        .profiles()
        .find_by_user(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;

    let session = state
        .billing
        .create_checkout_session(
            profile.customer_id.as_deref(),
            &price_id,
            &current_user.id,
            plan.as_str(),
            &state.config.checkout_success_url,
            &state.config.checkout_cancel_url,
        )
        .await?;

    let url = session
        .url
        .ok_or_else(|| AppError::provider("Checkout session has no redirect url"))?;

    tracing::info!(user_id = %current_user.id, plan = %plan.as_str(), "Checkout session created");
    Ok(Json(UrlResponse { url }))
}

/// Open the provider's billing portal for the customer that paid a
/// given checkout session.
pub async fn portal_session(
    State(state): State<ServerState>,
    _current_user: CurrentUser,
    Json(req): Json<PortalRequest>,
) -> AppResult<Json<UrlResponse>> {
    let session = state
        .billing
        .retrieve_checkout_session(&req.session_id)
        .await?;

    let customer = session
        .customer
        .ok_or_else(|| AppError::invalid("Session has no customer"))?;

    let portal = state
        .billing
        .create_portal_session(&customer, &state.config.checkout_success_url)
        .await?;

    Ok(Json(UrlResponse { url: portal.url }))
}

/// Provider webhook. Bad signature or malformed JSON is a 400 with no
/// state change; unrecognized event types are acknowledged and ignored.
pub async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<Json<serde_json::Value>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::invalid("Missing signature header"))?;

    let now_secs = chrono::Utc::now().timestamp();
    verify_signature(
        &body,
        signature,
        &state.config.billing_webhook_secret,
        now_secs,
    )
    .map_err(|e| {
        tracing::warn!(target: "billing", error = %e, "Webhook signature rejected");
        AppError::invalid("Invalid signature")
    })?;

    let event =
        WebhookEvent::parse(&body).map_err(|_| AppError::invalid("Malformed event payload"))?;

    reconcile::handle_event(&state.profiles(), &state.billing, &event).await?;

    Ok(Json(serde_json::json!({ "received": true })))
}
