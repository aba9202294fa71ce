//! The fixed tier catalog.
//!
//! Tiers are generated once from daily-volume checkpoints, priced through
//! the [`PriceCalculator`], and never change afterwards. The catalog is
//! ordered by ascending capacity and always ends with an open-ended
//! "Custom" tier, which is what lets [`crate::recommend`] cover every
//! volume.

use crate::calculator::{Price, PriceCalculator};
use crate::config::PricingConfig;
use crate::format::group_thousands;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Name of the trailing open-ended tier.
pub const CUSTOM_TIER_NAME: &str = "Custom";

const STATIC_FEATURES: [&str; 2] = ["Core features included", "Support for all platforms"];

static DEFAULT_CATALOG: Lazy<Arc<TierCatalog>> = Lazy::new(|| {
    let config = PricingConfig::default();
    Arc::new(TierCatalog::from_config(&config))
});

/// The catalog for [`PricingConfig::default()`], generated on first use and
/// shared for the rest of the process.
pub fn default_catalog() -> Arc<TierCatalog> {
    Arc::clone(&DEFAULT_CATALOG)
}

/// How many requests a tier allows.
///
/// `Unbounded` orders after every bounded capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Capacity {
    Bounded(u64),
    Unbounded,
}

impl Capacity {
    pub fn covers(&self, volume: u64) -> bool {
        match self {
            Capacity::Bounded(limit) => volume <= *limit,
            Capacity::Unbounded => true,
        }
    }

    pub fn limit(&self) -> Option<u64> {
        match self {
            Capacity::Bounded(limit) => Some(*limit),
            Capacity::Unbounded => None,
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Bounded(limit) => f.write_str(&group_thousands(Decimal::from(*limit))),
            Capacity::Unbounded => f.write_str("unlimited"),
        }
    }
}

/// A named subscription level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub name: String,
    pub daily_volume: Capacity,
    pub monthly_volume: Capacity,
    /// `NeedsCustomQuote` only for the trailing Custom tier.
    pub monthly_price: Price,
    pub per_request_price: Option<Decimal>,
    pub features: Vec<String>,
    pub is_popular: bool,
}

impl PricingTier {
    pub fn is_custom(&self) -> bool {
        self.monthly_volume == Capacity::Unbounded
    }
}

/// Immutable, capacity-ordered list of tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierCatalog {
    tiers: Vec<PricingTier>,
}

impl TierCatalog {
    /// Build the catalog.
    ///
    /// `daily_checkpoints` must be ascending (the config validates this).
    /// Names are matched by index and fall back to `Tier N`; the tier at
    /// `popular` is flagged. Exactly one Custom tier is appended.
    pub fn generate(
        calculator: &PriceCalculator,
        days_per_month: u64,
        daily_checkpoints: &[u64],
        names: &[String],
        popular: Option<usize>,
    ) -> Self {
        let mut tiers = Vec::with_capacity(daily_checkpoints.len() + 1);

        for (i, &daily) in daily_checkpoints.iter().enumerate() {
            let monthly = daily.saturating_mul(days_per_month);
            let monthly_price = calculator.price_for_monthly_volume(monthly);
            let name = names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Tier {}", i + 1));

            let mut features = vec![format!("{}k requests/month", thousands_of(monthly))];
            features.extend(STATIC_FEATURES.iter().map(|s| s.to_string()));

            tiers.push(PricingTier {
                name,
                daily_volume: Capacity::Bounded(daily),
                monthly_volume: Capacity::Bounded(monthly),
                monthly_price,
                per_request_price: calculator.per_request_price(monthly_price, monthly),
                features,
                is_popular: popular == Some(i),
            });
        }

        let custom_features = match daily_checkpoints.last() {
            Some(&largest) => vec![format!(
                "More than {}k requests/month",
                thousands_of(largest.saturating_mul(days_per_month))
            )],
            None => Vec::new(),
        };
        tiers.push(PricingTier {
            name: CUSTOM_TIER_NAME.to_string(),
            daily_volume: Capacity::Unbounded,
            monthly_volume: Capacity::Unbounded,
            monthly_price: Price::NeedsCustomQuote,
            per_request_price: None,
            features: custom_features,
            is_popular: false,
        });

        debug!("Generated tier catalog with {} tiers", tiers.len());
        Self { tiers }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::generate(
            &PriceCalculator::from_config(config),
            config.days_per_month,
            &config.daily_checkpoints,
            &config.tier_names,
            config.popular_tier,
        )
    }

    pub fn tiers(&self) -> &[PricingTier] {
        &self.tiers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricingTier> {
        self.tiers.iter()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Tiers with a list price, i.e. everything except Custom.
    pub fn fixed(&self) -> impl Iterator<Item = &PricingTier> {
        self.tiers.iter().filter(|t| !t.is_custom())
    }

    pub fn popular(&self) -> Option<&PricingTier> {
        self.tiers.iter().find(|t| t.is_popular)
    }

    pub fn by_name(&self, name: &str) -> Option<&PricingTier> {
        self.tiers.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a TierCatalog {
    type Item = &'a PricingTier;
    type IntoIter = std::slice::Iter<'a, PricingTier>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiers.iter()
    }
}

fn thousands_of(monthly: u64) -> String {
    group_thousands(Decimal::from(monthly) / Decimal::from(1_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(n: i64) -> Price {
        Price::Priced(Decimal::from(n))
    }

    #[test]
    fn default_catalog_shape() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.fixed().count(), 11);
        assert_eq!(catalog.tiers().iter().filter(|t| t.is_popular).count(), 1);
        assert_eq!(catalog.popular().unwrap().name, "Growth");

        let last = catalog.tiers().last().unwrap();
        assert_eq!(last.name, CUSTOM_TIER_NAME);
        assert_eq!(last.monthly_price, Price::NeedsCustomQuote);
        assert_eq!(last.monthly_volume, Capacity::Unbounded);
        assert_eq!(last.features, vec!["More than 30,000k requests/month".to_string()]);
    }

    #[test]
    fn default_catalog_prices() {
        let catalog = default_catalog();
        let prices: Vec<Price> = catalog.fixed().map(|t| t.monthly_price).collect();
        assert_eq!(
            prices,
            vec![
                price(49),
                price(81),
                price(120),
                price(210),
                price(315),
                price(525),
                price(900),
                price(1_800),
                price(3_600),
                price(7_500),
                price(15_000),
            ]
        );
    }

    #[test]
    fn capacities_and_prices_ascend() {
        let catalog = default_catalog();
        for pair in catalog.tiers().windows(2) {
            assert!(pair[0].monthly_volume < pair[1].monthly_volume);
        }
        let amounts: Vec<Decimal> = catalog
            .fixed()
            .filter_map(|t| t.monthly_price.amount())
            .collect();
        assert!(amounts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn starter_tier_details() {
        let catalog = default_catalog();
        let starter = &catalog.tiers()[0];
        assert_eq!(starter.name, "Starter");
        assert_eq!(starter.daily_volume, Capacity::Bounded(1_000));
        assert_eq!(starter.monthly_volume, Capacity::Bounded(30_000));
        assert_eq!(
            starter.features,
            vec![
                "30k requests/month".to_string(),
                "Core features included".to_string(),
                "Support for all platforms".to_string(),
            ]
        );
        assert_eq!(
            starter.per_request_price,
            Some(Decimal::from(49) / Decimal::from(30_000))
        );
    }

    #[test]
    fn large_tier_feature_is_grouped() {
        let catalog = default_catalog();
        let titan = catalog.by_name("titan").unwrap();
        assert_eq!(titan.features[0], "30,000k requests/month");
    }

    #[test]
    fn generation_is_idempotent() {
        let config = PricingConfig::default();
        let a = TierCatalog::from_config(&config);
        let b = TierCatalog::from_config(&config);
        assert_eq!(a, b);
        assert_eq!(&a, default_catalog().as_ref());
    }

    #[test]
    fn default_catalog_is_shared() {
        assert!(Arc::ptr_eq(&default_catalog(), &default_catalog()));
    }

    #[test]
    fn names_fall_back_to_tier_n() {
        let calc = PriceCalculator::default();
        let names = vec!["Solo".to_string()];
        let catalog = TierCatalog::generate(&calc, 30, &[100, 200, 300], &names, Some(5));
        let got: Vec<&str> = catalog.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(got, vec!["Solo", "Tier 2", "Tier 3", "Custom"]);
        assert!(catalog.popular().is_none());
    }

    #[test]
    fn fractional_thousands_in_features() {
        let calc = PriceCalculator::default();
        let catalog = TierCatalog::generate(&calc, 30, &[50], &[], None);
        assert_eq!(catalog.tiers()[0].features[0], "1.5k requests/month");
    }

    #[test]
    fn empty_checkpoints_still_have_custom() {
        let calc = PriceCalculator::default();
        let catalog = TierCatalog::generate(&calc, 30, &[], &[], Some(0));
        assert_eq!(catalog.len(), 1);
        assert!(catalog.tiers()[0].is_custom());
        assert!(catalog.tiers()[0].features.is_empty());
    }

    #[test]
    fn capacity_ordering() {
        assert!(Capacity::Bounded(u64::MAX) < Capacity::Unbounded);
        assert!(Capacity::Unbounded.covers(u64::MAX));
        assert!(!Capacity::Bounded(10).covers(11));
        assert_eq!(Capacity::Bounded(30_000).to_string(), "30,000");
    }
}
