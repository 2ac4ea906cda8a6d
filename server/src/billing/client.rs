//! Payment provider REST client.
//!
//! Thin form-encoded client over the provider's HTTP API. The base URL
//! is configurable so tests can point it at a local stub.

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected provider response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BillingError {
    fn from(err: reqwest::Error) -> Self {
        BillingError::Request(err.to_string())
    }
}

pub type BillingResult<T> = Result<T, BillingError>;

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub customer: Option<String>,
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub status: String,
    /// Unix seconds as reported by the provider
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalSession {
    pub url: String,
}

pub struct BillingClient {
    secret_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl BillingClient {
    pub fn new(secret_key: String, base_url: String) -> Self {
        Self {
            secret_key,
            base_url,
            http: reqwest::Client::new(),
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> BillingResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BillingError::Api {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| BillingError::Decode(e.to_string()))
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> BillingResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BillingError::Api {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| BillingError::Decode(e.to_string()))
    }

    pub async fn create_customer(&self, email: &str, name: &str) -> BillingResult<Customer> {
        self.post(
            "/customers",
            &[("email", email.to_string()), ("name", name.to_string())],
        )
        .await
    }

    /// Create a subscription-mode checkout session carrying the user id
    /// in metadata so the webhook can map the session back.
    pub async fn create_checkout_session(
        &self,
        customer_id: Option<&str>,
        price_id: &str,
        user_id: &str,
        plan: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> BillingResult<CheckoutSession> {
        let mut form = vec![
            ("mode", "subscription".to_string()),
            ("line_items[0][price]", price_id.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", success_url.to_string()),
            ("cancel_url", cancel_url.to_string()),
            ("metadata[user_id]", user_id.to_string()),
            ("metadata[plan]", plan.to_string()),
        ];
        if let Some(customer) = customer_id {
            form.push(("customer", customer.to_string()));
        }
        self.post("/checkout/sessions", &form).await
    }

    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> BillingResult<CheckoutSession> {
        self.get(&format!("/checkout/sessions/{session_id}")).await
    }

    pub async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> BillingResult<Subscription> {
        self.get(&format!("/subscriptions/{subscription_id}")).await
    }

    pub async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> BillingResult<PortalSession> {
        self.post(
            "/billing_portal/sessions",
            &[
                ("customer", customer_id.to_string()),
                ("return_url", return_url.to_string()),
            ],
        )
        .await
    }
}
