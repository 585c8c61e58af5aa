//! Budget tiers, cost ceilings, and the relaxation ladder.
//!
//! Each tier label maps to a per-item ceiling, a total ceiling, and an
//! instruction string embedded in the generation request. Tiers are totally
//! ordered by ceiling; `$0` is special-cased throughout: it requires items to
//! actually be free, not merely under a ceiling.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named budget bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    Free,
    UpToFifty,
    UpToOneFifty,
    UpToFiveHundred,
    Premium,
}

/// Cost ceilings and prompt instruction for a tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierLimits {
    pub per_item_max: f64,
    pub total_max: f64,
    pub instruction: &'static str,
}

/// Conservative default applied to unrecognized tier labels.
pub const DEFAULT_LIMITS: TierLimits = TierLimits {
    per_item_max: 45.0,
    total_max: 150.0,
    instruction: "Keep the total cost under $150 and prefer events under $45 each.",
};

impl BudgetTier {
    /// Parse a tier label. Returns `None` for unrecognized labels; callers
    /// that need a tier unconditionally go through [`limits_for`], which
    /// falls back to [`DEFAULT_LIMITS`].
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "$0" => Some(Self::Free),
            "$1-$50" => Some(Self::UpToFifty),
            "$51-$150" => Some(Self::UpToOneFifty),
            "$151-$500" => Some(Self::UpToFiveHundred),
            "$500+" => Some(Self::Premium),
            _ => None,
        }
    }

    /// The canonical label for this tier.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Free => "$0",
            Self::UpToFifty => "$1-$50",
            Self::UpToOneFifty => "$51-$150",
            Self::UpToFiveHundred => "$151-$500",
            Self::Premium => "$500+",
        }
    }

    /// Cost ceilings and generation instruction for this tier.
    pub fn limits(&self) -> TierLimits {
        match self {
            Self::Free => TierLimits {
                per_item_max: 0.0,
                total_max: 0.0,
                instruction: "Select only free events. Every item must cost exactly $0 \
                              and the total must be $0.",
            },
            Self::UpToFifty => TierLimits {
                per_item_max: 25.0,
                total_max: 50.0,
                instruction: "Keep the total cost under $50 and prefer events under $25 each.",
            },
            Self::UpToOneFifty => TierLimits {
                per_item_max: 75.0,
                total_max: 150.0,
                instruction: "Keep the total cost under $150 and prefer events under $75 each.",
            },
            Self::UpToFiveHundred => TierLimits {
                per_item_max: 250.0,
                total_max: 500.0,
                instruction: "Keep the total cost under $500 and prefer events under $250 each.",
            },
            Self::Premium => TierLimits {
                per_item_max: 500.0,
                total_max: 1500.0,
                instruction: "Budget is generous: up to $1500 total, up to $500 per event. \
                              Prioritize quality over cost.",
            },
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolve ceilings for a raw tier label, falling back to the conservative
/// default on unknown labels.
pub fn limits_for(label: &str) -> TierLimits {
    match BudgetTier::from_label(label) {
        Some(tier) => tier.limits(),
        None => {
            tracing::warn!(label, "unknown budget tier label; using default limits");
            DEFAULT_LIMITS
        }
    }
}

// ---------------------------------------------------------------------------
// Relaxation ladder
// ---------------------------------------------------------------------------

/// One step of the budget relaxation ladder applied by the normalizer.
///
/// Steps are tried in order until a non-empty candidate set is produced:
/// strict ceiling, doubled ceiling, then no filter at all. At most two
/// relaxation steps follow the strict filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxationStep {
    Strict,
    Doubled,
    Unfiltered,
}

/// The full ladder, strictest first.
pub const RELAXATION_LADDER: [RelaxationStep; 3] = [
    RelaxationStep::Strict,
    RelaxationStep::Doubled,
    RelaxationStep::Unfiltered,
];

impl RelaxationStep {
    /// The effective per-item ceiling at this step, `None` meaning no filter.
    pub fn ceiling(&self, per_item_max: f64) -> Option<f64> {
        match self {
            Self::Strict => Some(per_item_max),
            Self::Doubled => Some(per_item_max * 2.0),
            Self::Unfiltered => None,
        }
    }
}

impl fmt::Display for RelaxationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Strict => "strict",
            Self::Doubled => "doubled",
            Self::Unfiltered => "unfiltered",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_roundtrip_for_all_tiers() {
        let tiers = [
            BudgetTier::Free,
            BudgetTier::UpToFifty,
            BudgetTier::UpToOneFifty,
            BudgetTier::UpToFiveHundred,
            BudgetTier::Premium,
        ];
        for tier in &tiers {
            let parsed = BudgetTier::from_label(tier.label());
            assert_eq!(parsed, Some(*tier), "label {:?}", tier.label());
        }
    }

    #[test]
    fn unknown_label_parses_to_none() {
        assert_eq!(BudgetTier::from_label("$bogus"), None);
        assert_eq!(BudgetTier::from_label(""), None);
    }

    #[test]
    fn unknown_label_gets_default_limits() {
        let limits = limits_for("whatever");
        assert_eq!(limits.per_item_max, DEFAULT_LIMITS.per_item_max);
        assert_eq!(limits.total_max, DEFAULT_LIMITS.total_max);
    }

    #[test]
    fn tiers_are_ordered_by_ceiling() {
        let ceilings: Vec<f64> = [
            BudgetTier::Free,
            BudgetTier::UpToFifty,
            BudgetTier::UpToOneFifty,
            BudgetTier::UpToFiveHundred,
            BudgetTier::Premium,
        ]
        .iter()
        .map(|t| t.limits().total_max)
        .collect();
        for pair in ceilings.windows(2) {
            assert!(pair[0] < pair[1], "ceilings must strictly increase: {ceilings:?}");
        }
    }

    #[test]
    fn free_tier_ceilings_are_zero() {
        let limits = BudgetTier::Free.limits();
        assert_eq!(limits.per_item_max, 0.0);
        assert_eq!(limits.total_max, 0.0);
    }

    #[test]
    fn instructions_carry_numeric_ceilings() {
        for tier in [
            BudgetTier::UpToFifty,
            BudgetTier::UpToOneFifty,
            BudgetTier::UpToFiveHundred,
        ] {
            let limits = tier.limits();
            assert!(
                limits.instruction.contains(&format!("${}", limits.total_max as i64)),
                "instruction for {tier} should name its total ceiling"
            );
        }
    }

    #[test]
    fn ladder_ceilings_loosen_in_order() {
        assert_eq!(RelaxationStep::Strict.ceiling(25.0), Some(25.0));
        assert_eq!(RelaxationStep::Doubled.ceiling(25.0), Some(50.0));
        assert_eq!(RelaxationStep::Unfiltered.ceiling(25.0), None);
    }
}
