use serde::{Deserialize, Serialize};
use std::fmt;

/// Billing cadence of a bundle. The free-text `plan_type` column resolves to
/// one of these, and the access duration comes from this table alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Weekly,
    Monthly,
    Yearly,
}

impl PlanType {
    /// Resolve a stored plan label. Labels mentioning "weekly" or "yearly"
    /// (any case) map to those cadences; every other non-empty label bills
    /// as monthly. Empty labels are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        if lowered.is_empty() {
            return None;
        }
        if lowered.contains("weekly") {
            Some(PlanType::Weekly)
        } else if lowered.contains("yearly") {
            Some(PlanType::Yearly)
        } else {
            Some(PlanType::Monthly)
        }
    }

    pub fn duration_days(&self) -> i64 {
        match self {
            PlanType::Weekly => 7,
            PlanType::Monthly => 30,
            PlanType::Yearly => 365,
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanType::Weekly => "weekly",
            PlanType::Monthly => "monthly",
            PlanType::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_labels_run_seven_days() {
        for label in ["weekly", "Weekly Plan", "WEEKLY-SPECIAL"] {
            assert_eq!(PlanType::parse(label), Some(PlanType::Weekly));
        }
        assert_eq!(PlanType::Weekly.duration_days(), 7);
    }

    #[test]
    fn yearly_labels_run_a_year() {
        assert_eq!(PlanType::parse("yearly"), Some(PlanType::Yearly));
        assert_eq!(PlanType::parse("Yearly Mega Pack"), Some(PlanType::Yearly));
        assert_eq!(PlanType::Yearly.duration_days(), 365);
    }

    #[test]
    fn everything_else_bills_monthly() {
        for label in ["monthly", "custom", "family bundle", "3months"] {
            assert_eq!(PlanType::parse(label), Some(PlanType::Monthly));
        }
        assert_eq!(PlanType::Monthly.duration_days(), 30);
    }

    #[test]
    fn empty_labels_are_rejected() {
        assert_eq!(PlanType::parse(""), None);
        assert_eq!(PlanType::parse("   "), None);
    }
}
