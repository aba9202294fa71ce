//! Price calculation: monthly volume → monthly price, annual price, unit price.
//!
//! All arithmetic is done in [`Decimal`] so `volume × 0.0011` is exact before
//! it is rounded; rounding is half-up to whole currency units.

use crate::config::PricingConfig;
use crate::schedule::RateSchedule;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Months billed by an annual plan before the discount is applied.
const MONTHS_PER_YEAR: u32 = 12;

/// Result of pricing a volume.
///
/// Volumes past the last rate ceiling have no list price; they are a
/// distinct `NeedsCustomQuote` state rather than a zero amount, so a
/// caller can never mistake them for a free tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Price {
    /// A real price in local currency units.
    Priced(Decimal),
    /// Contact sales.
    NeedsCustomQuote,
}

impl Price {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Price::Priced(amount) => Some(*amount),
            Price::NeedsCustomQuote => None,
        }
    }

    pub fn is_priced(&self) -> bool {
        matches!(self, Price::Priced(_))
    }
}

/// Round half away from zero to whole currency units.
pub(crate) fn round_units(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Resolves volumes to prices against a [`RateSchedule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceCalculator {
    schedule: RateSchedule,
    min_monthly_price: Decimal,
    annual_discount: Decimal,
}

impl PriceCalculator {
    pub fn new(
        schedule: RateSchedule,
        min_monthly_price: Decimal,
        annual_discount: Decimal,
    ) -> Self {
        Self {
            schedule,
            min_monthly_price,
            annual_discount,
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(
            config.schedule.clone(),
            config.min_monthly_price,
            config.annual_discount,
        )
    }

    pub fn schedule(&self) -> &RateSchedule {
        &self.schedule
    }

    pub fn min_monthly_price(&self) -> Decimal {
        self.min_monthly_price
    }

    pub fn annual_discount(&self) -> Decimal {
        self.annual_discount
    }

    /// Price a monthly request volume.
    ///
    /// The whole volume is charged at the rate of the first bracket whose
    /// ceiling is ≥ `monthly_volume`, rounded to whole units and raised to
    /// the floor price. Past the last ceiling, or when `volume × rate` does
    /// not fit in a [`Decimal`], the result is [`Price::NeedsCustomQuote`].
    pub fn price_for_monthly_volume(&self, monthly_volume: u64) -> Price {
        let raw = self
            .schedule
            .rule_for(monthly_volume)
            .and_then(|rule| Decimal::from(monthly_volume).checked_mul(rule.rate_per_request));
        match raw {
            Some(raw) => Price::Priced(round_units(raw).max(self.min_monthly_price)),
            None => Price::NeedsCustomQuote,
        }
    }

    /// Twelve months less the annual discount, before rounding.
    ///
    /// Stablecoin estimates of an annual quote convert this figure. `None`
    /// on overflow.
    pub fn annual_total(&self, monthly_price: Decimal) -> Option<Decimal> {
        monthly_price
            .checked_mul(Decimal::from(MONTHS_PER_YEAR))?
            .checked_mul(Decimal::ONE - self.annual_discount)
    }

    /// Yearly price for a monthly price: [`Self::annual_total`] rounded to
    /// whole units. Not floored.
    pub fn annual_price(&self, monthly_price: Decimal) -> Option<Decimal> {
        self.annual_total(monthly_price).map(round_units)
    }

    /// [`Self::annual_price`] lifted over [`Price`]; overflow becomes a
    /// custom quote.
    pub fn annual(&self, monthly: Price) -> Price {
        match monthly.amount().and_then(|amount| self.annual_price(amount)) {
            Some(annual) => Price::Priced(annual),
            None => Price::NeedsCustomQuote,
        }
    }

    /// Cost of one request at a given monthly price.
    ///
    /// `None` for a zero volume or for a price that is not a real price.
    pub fn per_request_price(&self, monthly_price: Price, monthly_volume: u64) -> Option<Decimal> {
        let amount = monthly_price.amount()?;
        if monthly_volume == 0 {
            return None;
        }
        amount.checked_div(Decimal::from(monthly_volume))
    }
}

impl Default for PriceCalculator {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}
