//! Subscription plans.

/// Billing cadence offered at checkout. Unknown values fall back to
/// monthly rather than failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Weekly,
    Monthly,
    Yearly,
}

impl Plan {
    pub fn parse(value: &str) -> Self {
        match value {
            "weekly" => Self::Weekly,
            "yearly" => Self::Yearly,
            _ => Self::Monthly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_plan_defaults_to_monthly() {
        assert_eq!(Plan::parse("weekly"), Plan::Weekly);
        assert_eq!(Plan::parse("yearly"), Plan::Yearly);
        assert_eq!(Plan::parse("monthly"), Plan::Monthly);
        assert_eq!(Plan::parse("daily"), Plan::Monthly);
        assert_eq!(Plan::parse(""), Plan::Monthly);
    }
}
