//! Billing Module
//!
//! Payment provider client, webhook verification and subscription
//! reconciliation.

pub mod client;
pub mod plan;
pub mod reconcile;
pub mod webhook;

pub use client::{BillingClient, BillingError, BillingResult};
pub use plan::Plan;
pub use webhook::{WebhookError, WebhookEvent, verify_signature};
