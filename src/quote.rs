//! Custom quotes: the on-demand estimate for a user-supplied volume.

use crate::calculator::{Price, PriceCalculator};
use crate::catalog::{PricingTier, TierCatalog};
use crate::recommend::recommend;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    #[default]
    Monthly,
    Annual,
}

impl BillingPeriod {
    /// Unit shown after a price: `mo` or `year`.
    pub fn suffix(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "mo",
            BillingPeriod::Annual => "year",
        }
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BillingPeriod::Monthly => "monthly",
            BillingPeriod::Annual => "annual",
        })
    }
}

impl FromStr for BillingPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "mo" => Ok(BillingPeriod::Monthly),
            "annual" | "annually" | "yearly" | "year" => Ok(BillingPeriod::Annual),
            other => Err(format!("unknown billing period '{other}' (expected monthly or annual)")),
        }
    }
}

/// Estimate for one volume / billing-period pair.
///
/// Ephemeral: recompute it whenever the input changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingQuote<'a> {
    pub daily_volume: u64,
    pub monthly_volume: u64,
    pub billing_period: BillingPeriod,
    pub monthly_price: Price,
    pub annual_price: Price,
    /// Annual figure before rounding; stablecoin estimates convert this.
    pub annual_total: Option<Decimal>,
    /// `None` for a zero volume or a custom quote.
    pub per_request_price: Option<Decimal>,
    /// Fixed tier that would cover this volume with predictable pricing.
    pub recommended_tier: Option<&'a PricingTier>,
}

impl<'a> PricingQuote<'a> {
    /// Price the volume and look up the best-fit tier.
    pub fn compute(
        calculator: &PriceCalculator,
        catalog: &'a TierCatalog,
        days_per_month: u64,
        daily_volume: u64,
        billing_period: BillingPeriod,
    ) -> Self {
        let monthly_volume = daily_volume.saturating_mul(days_per_month);
        let monthly_price = calculator.price_for_monthly_volume(monthly_volume);
        Self {
            daily_volume,
            monthly_volume,
            billing_period,
            monthly_price,
            annual_price: calculator.annual(monthly_price),
            annual_total: monthly_price
                .amount()
                .and_then(|amount| calculator.annual_total(amount)),
            per_request_price: calculator.per_request_price(monthly_price, monthly_volume),
            recommended_tier: recommend(catalog, monthly_volume),
        }
    }

    /// The price for the selected billing period.
    pub fn price(&self) -> Price {
        match self.billing_period {
            BillingPeriod::Monthly => self.monthly_price,
            BillingPeriod::Annual => self.annual_price,
        }
    }

    /// Amount in local currency that the stablecoin estimate converts:
    /// the monthly price, or the unrounded annual total.
    pub fn stablecoin_basis(&self) -> Option<Decimal> {
        match self.billing_period {
            BillingPeriod::Monthly => self.monthly_price.amount(),
            BillingPeriod::Annual => self.annual_total,
        }
    }

    /// The selected price has no list value and must go to sales.
    pub fn needs_custom_quote(&self) -> bool {
        !self.price().is_priced()
    }

    /// Amount saved per year by choosing annual billing.
    pub fn annual_savings(&self) -> Option<Decimal> {
        let monthly = self.monthly_price.amount()?;
        let annual = self.annual_price.amount()?;
        monthly.checked_mul(Decimal::from(12))?.checked_sub(annual)
    }
}
