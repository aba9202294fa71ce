//! # tierquote
//!
//! Usage-based pricing for a request-metered API: tiered per-request rates,
//! a fixed subscription catalog, annual discounts, best-fit tier
//! recommendation and a stablecoin estimate of every price.
//!
//! ## Overview
//!
//! ```text
//! daily volume ─┐
//!               ├─ 1. Input       clamp / snap raw field text
//!               ├─ 2. Calculator  monthly volume × bracket rate, floor 49
//!               ├─ 3. Catalog     11 named tiers + Custom, generated once
//!               ├─ 4. Recommend   smallest tier covering the volume
//!               ├─ 5. Exchange    one background fetch, write-once cell
//!               └─ 6. Format      ₹ amounts, ≈ $ USDT or "—"
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tierquote::{format, BillingPeriod, Estimator, PricingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let estimator = Estimator::new(PricingConfig::default())?;
//!     let fetch = estimator.start_rate_fetch()?;
//!
//!     // Prices never wait for the exchange rate.
//!     let quote = estimator.quote(50_000, BillingPeriod::Monthly);
//!     println!("{}", format::period_amount(quote.price(), quote.billing_period));
//!
//!     fetch.await?;
//!     if let Some(amount) = quote.price().amount() {
//!         println!("{}", format::stablecoin(amount, &estimator.exchange_rate()));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `tierquote` binary (clap, anyhow, indicatif) |
//!
//! ## Default Rates
//!
//! | Monthly volume up to | Rate per request |
//! |----------------------|------------------|
//! | 15,000       | ₹0.0013 |
//! | 30,000       | ₹0.0011 |
//! | 50,000       | ₹0.0010 |
//! | 90,000       | ₹0.0009 |
//! | 150,000      | ₹0.0008 |
//! | 1,000,000    | ₹0.0007 |
//! | 10,000,000   | ₹0.0006 |
//! | 30,000,000   | ₹0.0005 |
//!
//! The whole volume is charged at one bracket's rate. Anything above
//! 30,000,000 requests a month is a custom quote.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod calculator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod estimator;
pub mod exchange;
pub mod format;
pub mod input;
pub mod quote;
pub mod recommend;
pub mod schedule;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use calculator::{Price, PriceCalculator};
pub use catalog::{default_catalog, Capacity, PricingTier, TierCatalog};
pub use config::{PricingConfig, PricingConfigBuilder, RateSourceConfig};
pub use error::{PricingError, RateFetchError};
pub use estimator::Estimator;
pub use exchange::{
    CurrencyPair, ExchangeRate, ExchangeRateCell, ExchangeRateProvider, RateState, RateValue,
};
pub use quote::{BillingPeriod, PricingQuote};
pub use recommend::recommend;
pub use rust_decimal::Decimal;
pub use schedule::{RateRule, RateSchedule};
