//! Tier recommendation: the smallest catalog tier that covers a volume.

use crate::catalog::{PricingTier, TierCatalog};

/// First tier, in catalog order, whose monthly capacity is ≥ `monthly_volume`.
///
/// The catalog is ascending and ends with an unbounded Custom tier, so this
/// only returns `None` for an empty catalog.
pub fn recommend(catalog: &TierCatalog, monthly_volume: u64) -> Option<&PricingTier> {
    catalog
        .iter()
        .find(|tier| tier.monthly_volume.covers(monthly_volume))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_catalog, Capacity, CUSTOM_TIER_NAME};

    fn name_for(volume: u64) -> String {
        let catalog = default_catalog();
        recommend(&catalog, volume).unwrap().name.clone()
    }

    #[test]
    fn exact_capacity_matches_that_tier() {
        assert_eq!(name_for(30_000), "Starter");
        assert_eq!(name_for(150_000), "Growth");
        assert_eq!(name_for(30_000_000), "Titan");
    }

    #[test]
    fn one_over_capacity_moves_up() {
        assert_eq!(name_for(0), "Starter");
        assert_eq!(name_for(30_001), "Basic");
        assert_eq!(name_for(1_500_001), "Enterprise");
    }

    #[test]
    fn beyond_every_fixed_tier_is_custom() {
        assert_eq!(name_for(30_000_001), CUSTOM_TIER_NAME);
        assert_eq!(name_for(u64::MAX), CUSTOM_TIER_NAME);
    }

    #[test]
    fn returns_smallest_covering_capacity() {
        let catalog = default_catalog();
        for volume in (0..=31_000_000u64).step_by(99_991) {
            let tier = recommend(&catalog, volume).unwrap();
            assert!(tier.monthly_volume.covers(volume));
            let smaller = catalog
                .iter()
                .filter(|t| t.monthly_volume < tier.monthly_volume)
                .any(|t| t.monthly_volume.covers(volume));
            assert!(!smaller, "a smaller tier than {} covers {volume}", tier.name);
        }
    }

    #[test]
    fn custom_tier_is_unbounded() {
        let catalog = default_catalog();
        let tier = recommend(&catalog, u64::MAX).unwrap();
        assert_eq!(tier.monthly_volume, Capacity::Unbounded);
    }
}
