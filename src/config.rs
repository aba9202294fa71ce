//! Configuration types for the pricing engine.
//!
//! Every tunable lives in [`PricingConfig`], built via its
//! [`PricingConfigBuilder`]. One struct means a whole pricing model can be
//! logged, serialised, or diffed against another in a single value.
//!
//! The defaults reproduce the published price list: the eight-bracket rate
//! schedule, a floor of 49, a 15 % annual discount, eleven catalog tiers
//! with "Growth" highlighted, and a USDT/INR rate from CoinGecko.

use crate::error::PricingError;
use crate::schedule::RateSchedule;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Daily-volume checkpoints of the fixed tiers, ascending.
pub const DEFAULT_DAILY_CHECKPOINTS: [u64; 11] = [
    1_000, 3_000, 5_000, 10_000, 15_000, 25_000, 50_000, 100_000, 200_000, 500_000, 1_000_000,
];

/// Names assigned to the fixed tiers in order. Extra checkpoints become `Tier N`.
pub const DEFAULT_TIER_NAMES: [&str; 11] = [
    "Starter",
    "Basic",
    "Growth",
    "Pro",
    "Advanced",
    "Scale",
    "Business",
    "Enterprise",
    "Ultimate",
    "Elite",
    "Titan",
];

/// Configuration for the pricing engine.
///
/// Built via [`PricingConfig::builder()`] or using [`PricingConfig::default()`].
///
/// # Example
/// ```rust
/// use tierquote::{Decimal, PricingConfig};
///
/// let config = PricingConfig::builder()
///     .min_monthly_price(Decimal::from(99))
///     .annual_discount_percent(20)
///     .build()
///     .unwrap();
/// assert_eq!(config.min_monthly_price, Decimal::from(99));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Volume brackets and their per-request rates.
    pub schedule: RateSchedule,

    /// Floor price per month in local currency units. Default: 49.
    pub min_monthly_price: Decimal,

    /// Fraction taken off twelve monthly payments for annual billing.
    /// Range: `[0, 1)`. Default: 0.15.
    pub annual_discount: Decimal,

    /// Multiplier from daily to monthly volume. Default: 30.
    pub days_per_month: u64,

    /// Daily volumes of the fixed tiers, strictly increasing and non-zero.
    pub daily_checkpoints: Vec<u64>,

    /// Display names of the fixed tiers, matched to checkpoints by index.
    pub tier_names: Vec<String>,

    /// Index of the tier flagged "Most Popular". Default: `Some(2)` ("Growth").
    pub popular_tier: Option<usize>,

    /// Where the stablecoin exchange rate comes from.
    pub rate_source: RateSourceConfig,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            schedule: RateSchedule::default(),
            min_monthly_price: Decimal::from(49),
            annual_discount: Decimal::new(15, 2),
            days_per_month: 30,
            daily_checkpoints: DEFAULT_DAILY_CHECKPOINTS.to_vec(),
            tier_names: DEFAULT_TIER_NAMES.iter().map(|s| s.to_string()).collect(),
            popular_tier: Some(2),
            rate_source: RateSourceConfig::default(),
        }
    }
}

impl PricingConfig {
    /// Create a new builder for `PricingConfig`.
    pub fn builder() -> PricingConfigBuilder {
        PricingConfigBuilder {
            config: Self::default(),
        }
    }

    /// Monthly volume for a daily volume, saturating instead of overflowing.
    pub fn monthly_volume(&self, daily: u64) -> u64 {
        daily.saturating_mul(self.days_per_month)
    }

    /// Check every cross-field constraint.
    ///
    /// The builder calls this; it is public so configs deserialised from
    /// elsewhere can be checked before use.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.min_monthly_price.is_sign_negative() {
            return Err(PricingError::InvalidConfig(format!(
                "minimum monthly price must not be negative, got {}",
                self.min_monthly_price
            )));
        }
        if self.annual_discount.is_sign_negative() || self.annual_discount >= Decimal::ONE {
            return Err(PricingError::InvalidConfig(format!(
                "annual discount must be in [0, 1), got {}",
                self.annual_discount
            )));
        }
        if self.days_per_month == 0 {
            return Err(PricingError::InvalidConfig(
                "days per month must be ≥ 1".into(),
            ));
        }
        if self.daily_checkpoints.first() == Some(&0) {
            return Err(PricingError::InvalidConfig(
                "tier checkpoints must be greater than zero".into(),
            ));
        }
        if self.daily_checkpoints.windows(2).any(|w| w[1] <= w[0]) {
            return Err(PricingError::InvalidConfig(
                "tier checkpoints must be strictly increasing".into(),
            ));
        }
        if self.rate_source.timeout_secs == 0 {
            return Err(PricingError::InvalidConfig(
                "exchange rate timeout must be ≥ 1s".into(),
            ));
        }
        if self.rate_source.asset_id.trim().is_empty()
            || self.rate_source.vs_currency.trim().is_empty()
        {
            return Err(PricingError::InvalidConfig(
                "exchange rate asset and currency must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`PricingConfig`].
#[derive(Debug)]
pub struct PricingConfigBuilder {
    config: PricingConfig,
}

impl PricingConfigBuilder {
    pub fn schedule(mut self, schedule: RateSchedule) -> Self {
        self.config.schedule = schedule;
        self
    }

    pub fn min_monthly_price(mut self, price: Decimal) -> Self {
        self.config.min_monthly_price = price;
        self
    }

    pub fn annual_discount(mut self, fraction: Decimal) -> Self {
        self.config.annual_discount = fraction;
        self
    }

    /// Convenience for whole percentages; clamped to 0–99.
    pub fn annual_discount_percent(mut self, percent: u32) -> Self {
        self.config.annual_discount = Decimal::new(i64::from(percent.min(99)), 2);
        self
    }

    pub fn days_per_month(mut self, days: u64) -> Self {
        self.config.days_per_month = days.max(1);
        self
    }

    pub fn daily_checkpoints(mut self, checkpoints: Vec<u64>) -> Self {
        self.config.daily_checkpoints = checkpoints;
        self
    }

    pub fn tier_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.tier_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn popular_tier(mut self, index: Option<usize>) -> Self {
        self.config.popular_tier = index;
        self
    }

    pub fn rate_source(mut self, source: RateSourceConfig) -> Self {
        self.config.rate_source = source;
        self
    }

    pub fn rate_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.rate_source.endpoint = endpoint.into();
        self
    }

    pub fn rate_timeout_secs(mut self, secs: u64) -> Self {
        self.config.rate_source.timeout_secs = secs.clamp(1, 120);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PricingConfig, PricingError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The external source of the local-currency-per-stablecoin rate.
///
/// The request is `GET {endpoint}/simple/price?ids={asset_id}&vs_currencies={vs_currency}`
/// and the consumed value is `body[asset_id][vs_currency]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSourceConfig {
    /// API base URL without trailing slash. Default: CoinGecko v3.
    pub endpoint: String,

    /// Stablecoin identifier on the source. Default: `tether`.
    pub asset_id: String,

    /// Local currency code, lowercase. Default: `inr`.
    pub vs_currency: String,

    /// Request timeout in seconds. A timeout counts as a failed fetch. Default: 10.
    pub timeout_secs: u64,
}

impl Default for RateSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.coingecko.com/api/v3".to_string(),
            asset_id: "tether".to_string(),
            vs_currency: "inr".to_string(),
            timeout_secs: 10,
        }
    }
}

impl RateSourceConfig {
    /// Full URL of the price lookup, without the query string.
    pub fn price_url(&self) -> String {
        format!("{}/simple/price", self.endpoint.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PricingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.daily_checkpoints.len(), config.tier_names.len());
        assert_eq!(config.tier_names[2], "Growth");
        assert_eq!(config.annual_discount, Decimal::new(15, 2));
    }

    #[test]
    fn builder_clamps_discount_percent() {
        let config = PricingConfig::builder()
            .annual_discount_percent(150)
            .build()
            .unwrap();
        assert_eq!(config.annual_discount, Decimal::new(99, 2));
    }

    #[test]
    fn rejects_full_discount() {
        let err = PricingConfig::builder()
            .annual_discount(Decimal::ONE)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("annual discount"), "got: {err}");
    }

    #[test]
    fn rejects_unsorted_checkpoints() {
        let result = PricingConfig::builder()
            .daily_checkpoints(vec![1_000, 500])
            .build();
        assert!(matches!(result, Err(PricingError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_checkpoint() {
        let result = PricingConfig::builder().daily_checkpoints(vec![0, 10]).build();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_negative_floor() {
        let result = PricingConfig::builder().min_monthly_price(Decimal::from(-1)).build();
        assert!(result.is_err());
    }

    #[test]
    fn monthly_volume_saturates() {
        let config = PricingConfig::default();
        assert_eq!(config.monthly_volume(1_000), 30_000);
        assert_eq!(config.monthly_volume(u64::MAX), u64::MAX);
    }

    #[test]
    fn price_url_trims_trailing_slash() {
        let source = RateSourceConfig {
            endpoint: "http://127.0.0.1:9000/".into(),
            ..Default::default()
        };
        assert_eq!(source.price_url(), "http://127.0.0.1:9000/simple/price");
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = PricingConfig::builder().popular_tier(None).build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: PricingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
