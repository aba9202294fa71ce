//! The rate schedule: monthly-volume ceilings mapped to per-request rates.
//!
//! Pricing is "all-units": the whole monthly volume is charged at the rate
//! of the first bracket whose ceiling covers it, not marginally bracket by
//! bracket. The schedule is plain data; the only lookup it offers is the
//! linear scan the calculator uses.

use crate::error::PricingError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One bracket of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRule {
    /// Largest monthly volume (inclusive) this rate applies to.
    pub volume_ceiling: u64,
    /// Price per request in local currency units.
    pub rate_per_request: Decimal,
}

impl RateRule {
    /// `rate` is given in ten-thousandths of a currency unit (13 → 0.0013).
    pub const fn per_ten_thousand(volume_ceiling: u64, rate: u32) -> Self {
        Self {
            volume_ceiling,
            rate_per_request: Decimal::from_parts(rate, 0, 0, false, 4),
        }
    }
}

/// Default brackets, ascending.
pub const DEFAULT_RULES: [RateRule; 8] = [
    RateRule::per_ten_thousand(15_000, 13),
    RateRule::per_ten_thousand(30_000, 11),
    RateRule::per_ten_thousand(50_000, 10),
    RateRule::per_ten_thousand(90_000, 9),
    RateRule::per_ten_thousand(150_000, 8),
    RateRule::per_ten_thousand(1_000_000, 7),
    RateRule::per_ten_thousand(10_000_000, 6),
    RateRule::per_ten_thousand(30_000_000, 5),
];

/// An ordered, validated sequence of [`RateRule`]s.
///
/// Ceilings are strictly increasing and rates are non-negative; both are
/// checked once in [`RateSchedule::new`] so lookups never have to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RateRule>", into = "Vec<RateRule>")]
pub struct RateSchedule {
    rules: Vec<RateRule>,
}

impl RateSchedule {
    pub fn new(rules: Vec<RateRule>) -> Result<Self, PricingError> {
        if rules.is_empty() {
            return Err(PricingError::InvalidConfig(
                "rate schedule must contain at least one rule".into(),
            ));
        }
        for pair in rules.windows(2) {
            if pair[1].volume_ceiling <= pair[0].volume_ceiling {
                return Err(PricingError::InvalidConfig(format!(
                    "rate schedule ceilings must be strictly increasing ({} then {})",
                    pair[0].volume_ceiling, pair[1].volume_ceiling
                )));
            }
        }
        if let Some(rule) = rules.iter().find(|r| r.rate_per_request.is_sign_negative()) {
            return Err(PricingError::InvalidConfig(format!(
                "rate for ceiling {} is negative: {}",
                rule.volume_ceiling, rule.rate_per_request
            )));
        }
        Ok(Self { rules })
    }

    /// First rule whose ceiling covers `monthly_volume`, or `None` once the
    /// volume is past the last ceiling.
    pub fn rule_for(&self, monthly_volume: u64) -> Option<&RateRule> {
        self.rules
            .iter()
            .find(|rule| monthly_volume <= rule.volume_ceiling)
    }

    /// Largest volume the schedule prices.
    pub fn max_ceiling(&self) -> u64 {
        // `new` rejects empty schedules.
        self.rules.last().map_or(0, |r| r.volume_ceiling)
    }

    pub fn rules(&self) -> &[RateRule] {
        &self.rules
    }
}

impl Default for RateSchedule {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }
}

impl TryFrom<Vec<RateRule>> for RateSchedule {
    type Error = PricingError;

    fn try_from(rules: Vec<RateRule>) -> Result<Self, Self::Error> {
        Self::new(rules)
    }
}

impl From<RateSchedule> for Vec<RateRule> {
    fn from(schedule: RateSchedule) -> Self {
        schedule.rules
    }
}
