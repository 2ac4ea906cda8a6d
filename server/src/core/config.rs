//! Server Configuration

use crate::auth::JwtConfig;
use crate::billing::client::DEFAULT_API_BASE;

/// Server configuration, loaded from environment variables.
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | Database, media and log storage |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | STRIPE_SECRET_KEY | (empty) | Provider API key |
/// | STRIPE_WEBHOOK_SECRET | (empty) | Webhook endpoint secret |
/// | STRIPE_API_BASE | provider default | Override for tests/stubs |
/// | STRIPE_PRICE_ID_WEEKLY / _MONTHLY / _YEARLY | (empty) | Plan price ids |
/// | CHECKOUT_SUCCESS_URL / CHECKOUT_CANCEL_URL | localhost pages | Checkout redirects |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database, media and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,

    // === Billing ===
    pub billing_secret_key: String,
    pub billing_webhook_secret: String,
    pub billing_api_base: String,
    pub price_id_weekly: String,
    pub price_id_monthly: String,
    pub price_id_yearly: String,
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults where unset.
    pub fn from_env() -> Self {
        Self {
            work_dir: env_or("WORK_DIR", "./data"),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: env_or("ENVIRONMENT", "development"),

            billing_secret_key: env_or("STRIPE_SECRET_KEY", ""),
            billing_webhook_secret: env_or("STRIPE_WEBHOOK_SECRET", ""),
            billing_api_base: env_or("STRIPE_API_BASE", DEFAULT_API_BASE),
            price_id_weekly: env_or("STRIPE_PRICE_ID_WEEKLY", ""),
            price_id_monthly: env_or("STRIPE_PRICE_ID_MONTHLY", ""),
            price_id_yearly: env_or("STRIPE_PRICE_ID_YEARLY", ""),
            checkout_success_url: env_or(
                "CHECKOUT_SUCCESS_URL",
                "http://localhost:5173/checkout/success",
            ),
            checkout_cancel_url: env_or(
                "CHECKOUT_CANCEL_URL",
                "http://localhost:5173/checkout/cancel",
            ),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn db_path(&self) -> String {
        format!("{}/db", self.work_dir)
    }

    pub fn media_dir(&self) -> String {
        format!("{}/media", self.work_dir)
    }

    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.work_dir)
    }

    /// Resolve the provider price id for a plan.
    pub fn price_id_for(&self, plan: crate::billing::Plan) -> &str {
        use crate::billing::Plan;
        match plan {
            Plan::Weekly => &self.price_id_weekly,
            Plan::Monthly => &self.price_id_monthly,
            Plan::Yearly => &self.price_id_yearly,
        }
    }
}
