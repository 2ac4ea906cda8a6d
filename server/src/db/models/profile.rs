//! Profile Model
//!
//! One profile per user: tax/contact details required for a "complete"
//! account, plus the payment-provider subscription state mirrored from
//! webhook events.

use super::serde_helpers;
use super::user::User;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Profile ID type
pub type ProfileId = RecordId;

/// Subscription status as reported by the payment provider.
///
/// This is not a state machine we drive; the provider's reported status is
/// authoritative and overwrites whatever was stored before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Incomplete,
    IncompleteExpired,
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
    None,
}

impl SubscriptionStatus {
    /// Parse a provider status string; unknown values map to `None`
    /// rather than erroring, since the provider may add statuses.
    pub fn parse(value: &str) -> Self {
        match value {
            "incomplete" => Self::Incomplete,
            "incomplete_expired" => Self::IncompleteExpired,
            "trialing" => Self::Trialing,
            "active" => Self::Active,
            "past_due" => Self::PastDue,
            "canceled" => Self::Canceled,
            "unpaid" => Self::Unpaid,
            _ => Self::None,
        }
    }
}

/// Profile record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<ProfileId>,
    /// Owning user (one-to-one)
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    /// RFC tax id (unique when present)
    pub tax_id: Option<String>,
    /// WhatsApp/contact number
    pub contact_number: Option<String>,

    // ── Payment provider fields ─────────────────────────────────────
    /// Legacy flag kept for compatibility; synchronized from provider events
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_subscribed: bool,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
    pub price_id: Option<String>,
    pub subscription_status: Option<SubscriptionStatus>,
    /// End of the current paid period, Unix millis
    pub current_period_end: Option<i64>,
}

impl Profile {
    pub fn new(user: RecordId) -> Self {
        Self {
            id: None,
            user,
            tax_id: None,
            contact_number: None,
            is_subscribed: false,
            customer_id: None,
            subscription_id: None,
            price_id: None,
            subscription_status: None,
            current_period_end: None,
        }
    }

    /// A profile is complete iff the identity's username, first name,
    /// last name and email plus the profile's tax id and contact number
    /// are all non-blank.
    pub fn is_complete(&self, user: &User) -> bool {
        let non_blank = |s: &str| !s.trim().is_empty();
        non_blank(&user.username)
            && non_blank(&user.first_name)
            && non_blank(&user.last_name)
            && non_blank(&user.email)
            && self.tax_id.as_deref().is_some_and(non_blank)
            && self.contact_number.as_deref().is_some_and(non_blank)
    }

    /// Business-level entitlement: is this user allowed paid features now?
    ///
    /// - trialing/active: entitled while period end is unset or in the future
    /// - past_due: grace window, entitled only while period end is in the future
    /// - canceled/unpaid/incomplete/incomplete_expired: paid-through semantics,
    ///   entitled only until the already-paid period elapses
    /// - no status: not entitled
    pub fn has_active_subscription(&self, now_millis: i64) -> bool {
        use SubscriptionStatus::*;

        let period_active = self
            .current_period_end
            .map(|end| end > now_millis)
            .unwrap_or(false);

        match self.subscription_status {
            Some(Trialing) | Some(Active) => {
                self.current_period_end.is_none() || period_active
            }
            Some(PastDue) => period_active,
            Some(Canceled) | Some(Unpaid) | Some(Incomplete) | Some(IncompleteExpired) => {
                period_active
            }
            Some(None) | Option::None => false,
        }
    }
}

/// Profile fields editable from the completion/edit form
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub tax_id: Option<String>,
    pub contact_number: Option<String>,
}

/// Partial overwrite of the payment fields, applied by reconciliation.
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubscriptionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: None,
            username: "carlos".to_string(),
            first_name: "Carlos".to_string(),
            last_name: "Dominguez".to_string(),
            email: "carlos@example.com".to_string(),
            password_hash: String::new(),
            created_at: 0,
        }
    }

    fn complete_profile() -> Profile {
        let mut p = Profile::new("user:carlos".parse().unwrap());
        p.tax_id = Some("GODE561231GR8".to_string());
        p.contact_number = Some("6561234567".to_string());
        p
    }

    #[test]
    fn complete_iff_all_required_fields_non_blank() {
        let user = test_user();
        let profile = complete_profile();
        assert!(profile.is_complete(&user));

        // Blanking any one required field flips the result
        let mut u = test_user();
        u.username = "  ".to_string();
        assert!(!profile.is_complete(&u));

        let mut u = test_user();
        u.first_name = String::new();
        assert!(!profile.is_complete(&u));

        let mut u = test_user();
        u.last_name = String::new();
        assert!(!profile.is_complete(&u));

        let mut u = test_user();
        u.email = String::new();
        assert!(!profile.is_complete(&u));

        let mut p = complete_profile();
        p.tax_id = None;
        assert!(!p.is_complete(&user));

        let mut p = complete_profile();
        p.contact_number = Some("   ".to_string());
        assert!(!p.is_complete(&user));
    }

    const HOUR: i64 = 3_600_000;

    #[test]
    fn entitlement_active_and_trialing() {
        let now = 1_700_000_000_000;
        let mut p = complete_profile();

        p.subscription_status = Some(SubscriptionStatus::Active);
        p.current_period_end = None;
        assert!(p.has_active_subscription(now));

        p.current_period_end = Some(now + HOUR);
        assert!(p.has_active_subscription(now));

        p.current_period_end = Some(now - HOUR);
        assert!(!p.has_active_subscription(now));

        p.subscription_status = Some(SubscriptionStatus::Trialing);
        p.current_period_end = None;
        assert!(p.has_active_subscription(now));
    }

    #[test]
    fn entitlement_grace_window() {
        let now = 1_700_000_000_000;
        let mut p = complete_profile();

        // past_due: only while the period is still running
        p.subscription_status = Some(SubscriptionStatus::PastDue);
        p.current_period_end = Some(now + HOUR);
        assert!(p.has_active_subscription(now));
        p.current_period_end = Some(now - HOUR);
        assert!(!p.has_active_subscription(now));
        p.current_period_end = None;
        assert!(!p.has_active_subscription(now));

        // canceled: paid-through
        p.subscription_status = Some(SubscriptionStatus::Canceled);
        p.current_period_end = Some(now + HOUR);
        assert!(p.has_active_subscription(now));
        p.current_period_end = Some(now - HOUR);
        assert!(!p.has_active_subscription(now));
    }

    #[test]
    fn entitlement_requires_status() {
        let now = 1_700_000_000_000;
        let mut p = complete_profile();
        p.current_period_end = Some(now + HOUR);
        assert!(!p.has_active_subscription(now));

        p.subscription_status = Some(SubscriptionStatus::None);
        assert!(!p.has_active_subscription(now));
    }

    #[test]
    fn provider_status_parsing_is_lenient() {
        assert_eq!(
            SubscriptionStatus::parse("past_due"),
            SubscriptionStatus::PastDue
        );
        assert_eq!(
            SubscriptionStatus::parse("something_new"),
            SubscriptionStatus::None
        );
    }
}
