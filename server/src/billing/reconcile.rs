//! Webhook event reconciliation.
//!
//! The provider's reported state is authoritative: every handler is an
//! idempotent overwrite of the stored subscription fields. Events that
//! reference unknown users or subscriptions are ignored so replays and
//! test-mode deliveries never fail the webhook.

use super::client::BillingClient;
use super::webhook::WebhookEvent;
use crate::db::models::{SubscriptionPatch, SubscriptionStatus};
use crate::db::repository::{ProfileRepository, parse_record_id};
use crate::utils::{AppError, AppResult};
use serde_json::Value;

fn str_field<'a>(object: &'a Value, key: &str) -> Option<&'a str> {
    object.get(key).and_then(|v| v.as_str())
}

/// Dispatch one verified event. Unrecognized event types are ignored.
pub async fn handle_event(
    profiles: &ProfileRepository,
    billing: &BillingClient,
    event: &WebhookEvent,
) -> AppResult<()> {
    let object = &event.data.object;
    match event.event_type.as_str() {
        "checkout.session.completed" => handle_checkout_completed(profiles, billing, object).await,
        "invoice.payment_succeeded" => handle_invoice_paid(profiles, billing, object).await,
        "customer.subscription.deleted"
        | "customer.subscription.canceled"
        | "customer.subscription.paused" => handle_subscription_ended(profiles, object).await,
        other => {
            tracing::debug!(event_type = %other, "Ignoring unhandled webhook event");
            Ok(())
        }
    }
}

/// A checkout finished: attach the provider ids to the buyer's profile
/// and pull the live subscription state.
pub async fn handle_checkout_completed(
    profiles: &ProfileRepository,
    billing: &BillingClient,
    object: &Value,
) -> AppResult<()> {
    let Some(user_id) = object
        .get("metadata")
        .and_then(|m| m.get("user_id"))
        .and_then(|v| v.as_str())
    else {
        tracing::warn!("Checkout completed without user_id metadata, ignoring");
        return Ok(());
    };

    // Malformed metadata is permanent and safe to drop; a database
    // failure must propagate so the provider redelivers the event.
    let Ok(user) = parse_record_id(user_id) else {
        tracing::warn!(user_id = %user_id, "Checkout completed with malformed user_id, ignoring");
        return Ok(());
    };
    let Some(profile) = profiles.find_by_user(&user).await? else {
        tracing::warn!(user_id = %user_id, "Checkout completed for unknown user, ignoring");
        return Ok(());
    };

    let mut patch = SubscriptionPatch {
        is_subscribed: Some(true),
        customer_id: str_field(object, "customer").map(str::to_string),
        subscription_id: str_field(object, "subscription").map(str::to_string),
        ..Default::default()
    };

    if let Some(subscription_id) = str_field(object, "subscription") {
        match billing.retrieve_subscription(subscription_id).await {
            Ok(subscription) => {
                patch.subscription_status =
                    Some(SubscriptionStatus::parse(&subscription.status));
                patch.current_period_end =
                    subscription.current_period_end.map(|secs| secs * 1000);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to retrieve subscription after checkout");
            }
        }
    }

    let profile_id = profile
        .id
        .ok_or_else(|| AppError::database("Profile without id"))?;
    profiles.apply_subscription(&profile_id, patch).await?;
    tracing::info!(user_id = %user_id, "Subscription activated from checkout");
    Ok(())
}

/// A renewal invoice was paid: push the period end forward.
pub async fn handle_invoice_paid(
    profiles: &ProfileRepository,
    billing: &BillingClient,
    object: &Value,
) -> AppResult<()> {
    let Some(subscription_id) = str_field(object, "subscription") else {
        return Ok(());
    };

    let Some(profile) = profiles.find_by_subscription(subscription_id).await? else {
        // One-off invoices and unknown subscriptions are not ours to track
        return Ok(());
    };

    let mut patch = SubscriptionPatch {
        is_subscribed: Some(true),
        ..Default::default()
    };
    match billing.retrieve_subscription(subscription_id).await {
        Ok(subscription) => {
            patch.subscription_status = Some(SubscriptionStatus::parse(&subscription.status));
            patch.current_period_end = subscription.current_period_end.map(|secs| secs * 1000);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to refresh subscription after invoice");
        }
    }

    let profile_id = profile
        .id
        .ok_or_else(|| AppError::database("Profile without id"))?;
    profiles.apply_subscription(&profile_id, patch).await?;
    Ok(())
}

/// The subscription ended (deleted/canceled/paused): drop the flag, keep
/// the period end so paid-through access keeps working until it lapses.
pub async fn handle_subscription_ended(
    profiles: &ProfileRepository,
    object: &Value,
) -> AppResult<()> {
    let Some(subscription_id) = str_field(object, "id") else {
        return Ok(());
    };

    let Some(profile) = profiles.find_by_subscription(subscription_id).await? else {
        return Ok(());
    };

    let patch = SubscriptionPatch {
        is_subscribed: Some(false),
        subscription_status: str_field(object, "status").map(SubscriptionStatus::parse),
        ..Default::default()
    };

    let profile_id = profile
        .id
        .ok_or_else(|| AppError::database("Profile without id"))?;
    profiles.apply_subscription(&profile_id, patch).await?;
    tracing::info!(subscription_id = %subscription_id, "Subscription ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use serde_json::json;
    use surrealdb::RecordId;

    fn offline_billing() -> BillingClient {
        // Points at a closed port so any accidental call fails fast
        BillingClient::new("sk_test_x".to_string(), "http://127.0.0.1:1".to_string())
    }

    #[tokio::test]
    async fn unknown_subscription_invoice_changes_nothing() {
        let db = DbService::new_memory().await.unwrap();
        let profiles = ProfileRepository::new(db.db.clone());
        let ana: RecordId = "user:ana".parse().unwrap();
        profiles.create_for_user(ana.clone()).await.unwrap();

        let object = json!({"subscription": "sub_unknown"});
        handle_invoice_paid(&profiles, &offline_billing(), &object)
            .await
            .unwrap();

        let profile = profiles.find_by_user(&ana).await.unwrap().unwrap();
        assert!(!profile.is_subscribed);
        assert!(profile.subscription_status.is_none());
    }

    #[tokio::test]
    async fn checkout_without_metadata_is_ignored() {
        let db = DbService::new_memory().await.unwrap();
        let profiles = ProfileRepository::new(db.db.clone());

        let object = json!({"customer": "cus_1"});
        handle_checkout_completed(&profiles, &offline_billing(), &object)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn checkout_for_malformed_or_unknown_user_is_ignored() {
        let db = DbService::new_memory().await.unwrap();
        let profiles = ProfileRepository::new(db.db.clone());

        let object = json!({"metadata": {"user_id": "not a record id"}});
        handle_checkout_completed(&profiles, &offline_billing(), &object)
            .await
            .unwrap();

        let object = json!({"metadata": {"user_id": "user:ghost"}});
        handle_checkout_completed(&profiles, &offline_billing(), &object)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn subscription_ended_clears_flag_but_keeps_period_end() {
        let db = DbService::new_memory().await.unwrap();
        let profiles = ProfileRepository::new(db.db.clone());
        let ana: RecordId = "user:ana".parse().unwrap();
        let profile = profiles.create_for_user(ana.clone()).await.unwrap();

        let period_end = 1_900_000_000_000;
        profiles
            .apply_subscription(
                profile.id.as_ref().unwrap(),
                SubscriptionPatch {
                    is_subscribed: Some(true),
                    subscription_id: Some("sub_9".to_string()),
                    subscription_status: Some(SubscriptionStatus::Active),
                    current_period_end: Some(period_end),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let object = json!({"id": "sub_9", "status": "canceled"});
        handle_subscription_ended(&profiles, &object).await.unwrap();

        let updated = profiles.find_by_user(&ana).await.unwrap().unwrap();
        assert!(!updated.is_subscribed);
        assert_eq!(
            updated.subscription_status,
            Some(SubscriptionStatus::Canceled)
        );
        assert_eq!(updated.current_period_end, Some(period_end));
    }

    #[tokio::test]
    async fn event_for_other_provider_object_is_ignored() {
        let db = DbService::new_memory().await.unwrap();
        let profiles = ProfileRepository::new(db.db.clone());

        let event = WebhookEvent::parse(
            r#"{"type":"charge.refunded","data":{"object":{"id":"ch_1"}}}"#,
        )
        .unwrap();
        handle_event(&profiles, &offline_billing(), &event)
            .await
            .unwrap();
    }
}
