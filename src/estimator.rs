//! The estimator: the entry point presentation layers talk to.
//!
//! An [`Estimator`] owns the three long-lived pieces of state and hands out
//! read-only views of them:
//!
//! ```text
//! Estimator
//!  ├─ calculator   rate schedule + floor + annual discount
//!  ├─ catalog      generated once, Arc-shared, never mutated
//!  └─ rate cell    settled at most once by the background fetch
//! ```
//!
//! Quotes are computed synchronously and never wait for the exchange rate.

use crate::calculator::PriceCalculator;
use crate::catalog::{default_catalog, PricingTier, TierCatalog};
use crate::config::PricingConfig;
use crate::error::PricingError;
use crate::exchange::{ExchangeRate, ExchangeRateCell, ExchangeRateProvider, RateState};
use crate::quote::{BillingPeriod, PricingQuote};
use crate::recommend::recommend;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Pricing engine for one process or session.
#[derive(Debug, Clone)]
pub struct Estimator {
    config: PricingConfig,
    calculator: PriceCalculator,
    catalog: Arc<TierCatalog>,
    rate: ExchangeRateCell,
}

impl Estimator {
    /// Validate `config` and generate its catalog.
    ///
    /// A config whose pricing fields match the defaults reuses the
    /// process-wide [`default_catalog`] instead of generating a copy.
    pub fn new(config: PricingConfig) -> Result<Self, PricingError> {
        config.validate()?;
        let calculator = PriceCalculator::from_config(&config);
        let catalog = if prices_like_default(&config) {
            default_catalog()
        } else {
            Arc::new(TierCatalog::from_config(&config))
        };
        info!(
            "Estimator ready: {} tiers, floor {}, annual discount {}",
            catalog.len(),
            config.min_monthly_price,
            config.annual_discount
        );
        Ok(Self {
            config,
            calculator,
            catalog,
            rate: ExchangeRateCell::new(),
        })
    }

    /// Replace the rate cell, e.g. with one that is already settled.
    pub fn with_exchange_rate(mut self, rate: ExchangeRateCell) -> Self {
        self.rate = rate;
        self
    }

    /// Kick off the one-time exchange-rate fetch in the background.
    ///
    /// Returns immediately; quotes can be produced while the fetch is in
    /// flight. Only the first call sends a request. Later calls, including
    /// calls on clones or after an injected rate, return a handle that
    /// completes at once. Must be called from within a tokio runtime.
    pub fn start_rate_fetch(&self) -> Result<JoinHandle<()>, PricingError> {
        let provider = ExchangeRateProvider::new(self.config.rate_source.clone())?;
        debug!("Spawning exchange rate fetch for {}", provider.pair());
        Ok(provider.spawn(self.rate.clone()))
    }

    /// Settle the rate cell directly. Returns `false` if it already settled.
    pub fn set_exchange_rate(&self, rate: ExchangeRate) -> bool {
        self.rate.set(rate)
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn calculator(&self) -> &PriceCalculator {
        &self.calculator
    }

    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    pub fn exchange_rate(&self) -> RateState<'_> {
        self.rate.state()
    }

    pub fn rate_cell(&self) -> &ExchangeRateCell {
        &self.rate
    }

    /// Estimate for a daily volume and billing period.
    pub fn quote(&self, daily_volume: u64, billing_period: BillingPeriod) -> PricingQuote<'_> {
        PricingQuote::compute(
            &self.calculator,
            &self.catalog,
            self.config.days_per_month,
            daily_volume,
            billing_period,
        )
    }

    /// Smallest catalog tier covering `monthly_volume`.
    pub fn recommend(&self, monthly_volume: u64) -> Option<&PricingTier> {
        recommend(&self.catalog, monthly_volume)
    }
}

fn prices_like_default(config: &PricingConfig) -> bool {
    let default = PricingConfig::default();
    config.schedule == default.schedule
        && config.min_monthly_price == default.min_monthly_price
        && config.days_per_month == default.days_per_month
        && config.daily_checkpoints == default.daily_checkpoints
        && config.tier_names == default.tier_names
        && config.popular_tier == default.popular_tier
}
