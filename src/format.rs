//! Display strings for prices, volumes and stablecoin estimates.
//!
//! Everything that depends on the exchange rate takes the [`RateState`] as
//! an argument; nothing here reads global state.

use crate::calculator::{Price, PriceCalculator};
use crate::catalog::PricingTier;
use crate::exchange::RateState;
use crate::quote::{BillingPeriod, PricingQuote};
use rust_decimal::{Decimal, RoundingStrategy};

/// Local currency symbol.
pub const LOCAL_SYMBOL: &str = "₹";

/// Shown in place of a stablecoin amount while the rate is pending or unavailable.
pub const PLACEHOLDER: &str = "—";

/// Shown in place of a price for the open-ended tier.
pub const CONTACT_FOR_PRICING: &str = "Contact us for pricing";

/// en-US digit grouping with at most three fraction digits: `30000` →
/// `"30,000"`, `1.5` → `"1.5"`.
pub fn group_thousands(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// `"₹1,224"`, or [`CONTACT_FOR_PRICING`].
pub fn local_amount(price: Price) -> String {
    match price.amount() {
        Some(amount) => format!("{LOCAL_SYMBOL}{}", group_thousands(amount)),
        None => CONTACT_FOR_PRICING.to_string(),
    }
}

/// `"₹500/year"`, or [`CONTACT_FOR_PRICING`].
pub fn period_amount(price: Price, period: BillingPeriod) -> String {
    match price {
        Price::Priced(_) => format!("{}/{}", local_amount(price), period.suffix()),
        Price::NeedsCustomQuote => CONTACT_FOR_PRICING.to_string(),
    }
}

/// Stablecoin figure with two decimals, or [`PLACEHOLDER`].
pub fn stablecoin_amount(amount_in_local: Decimal, rate: &RateState<'_>) -> String {
    match rate.convert(amount_in_local) {
        Some(converted) => format!("{:.2}", converted),
        None => PLACEHOLDER.to_string(),
    }
}

/// `"≈ $0.59 USDT"` / `"≈ $— USDT"`.
pub fn stablecoin(amount_in_local: Decimal, rate: &RateState<'_>) -> String {
    format!("≈ ${} USDT", stablecoin_amount(amount_in_local, rate))
}

/// `"≈ ₹0.0016 per request"`; only for positive prices.
pub fn per_request(unit_price: Option<Decimal>) -> Option<String> {
    let unit = unit_price.filter(|u| *u > Decimal::ZERO)?;
    let shown = unit.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    Some(format!("≈ {LOCAL_SYMBOL}{:.4} per request", shown))
}

/// Annual cards also name the monthly equivalent.
pub fn billed_annually_note(monthly: Price, period: BillingPeriod) -> Option<String> {
    match (period, monthly.amount()) {
        (BillingPeriod::Annual, Some(amount)) if amount > Decimal::ZERO => Some(format!(
            "{LOCAL_SYMBOL}{}/mo billed annually",
            group_thousands(amount)
        )),
        _ => None,
    }
}

/// Button label for a catalog tier.
pub fn tier_call_to_action(tier: &PricingTier) -> &'static str {
    match tier.monthly_price.amount() {
        Some(amount) if amount.is_zero() => "Get Started Free",
        Some(_) => "Choose Plan",
        None => "Contact Sales",
    }
}

/// Button label for the custom estimate.
pub fn quote_call_to_action(quote: &PricingQuote<'_>) -> &'static str {
    match quote.monthly_price.amount() {
        Some(amount) if amount > Decimal::ZERO => "Get Custom Plan",
        _ => "Contact Sales",
    }
}

/// The tier's own price for the selected period.
///
/// Annual tier prices are derived on the fly; the catalog only stores the
/// monthly figure.
pub fn tier_price(
    tier: &PricingTier,
    period: BillingPeriod,
    calculator: &PriceCalculator,
) -> Price {
    match period {
        BillingPeriod::Monthly => tier.monthly_price,
        BillingPeriod::Annual => calculator.annual(tier.monthly_price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::error::RateFetchError;
    use crate::exchange::{CurrencyPair, ExchangeRate};

    fn pair() -> CurrencyPair {
        CurrencyPair {
            asset: "tether".into(),
            vs_currency: "inr".into(),
        }
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands(Decimal::from(0)), "0");
        assert_eq!(group_thousands(Decimal::from(999)), "999");
        assert_eq!(group_thousands(Decimal::from(1_000)), "1,000");
        assert_eq!(group_thousands(Decimal::from(30_000_000)), "30,000,000");
        assert_eq!(group_thousands(Decimal::new(15, 1)), "1.5");
        assert_eq!(group_thousands(Decimal::new(12345678, 4)), "1,234.568");
        assert_eq!(group_thousands(Decimal::new(30000, 3)), "30");
        assert_eq!(group_thousands(Decimal::from(-1_500)), "-1,500");
    }

    #[test]
    fn local_amounts() {
        assert_eq!(local_amount(Price::Priced(Decimal::from(1_224))), "₹1,224");
        assert_eq!(local_amount(Price::NeedsCustomQuote), CONTACT_FOR_PRICING);
        assert_eq!(
            period_amount(Price::Priced(Decimal::from(500)), BillingPeriod::Annual),
            "₹500/year"
        );
        assert_eq!(
            period_amount(Price::Priced(Decimal::from(49)), BillingPeriod::Monthly),
            "₹49/mo"
        );
    }

    #[test]
    fn stablecoin_with_rate() {
        let rate = ExchangeRate::available(pair(), Decimal::new(8327, 2));
        let state = RateState::Settled(&rate);
        assert_eq!(stablecoin(Decimal::from(49), &state), "≈ $0.59 USDT");
        assert_eq!(stablecoin(Decimal::from(900), &state), "≈ $10.81 USDT");
    }

    #[test]
    fn stablecoin_placeholder_when_pending_or_failed() {
        assert_eq!(stablecoin(Decimal::from(49), &RateState::Pending), "≈ $— USDT");
        let failed = ExchangeRate::unavailable(pair(), RateFetchError::HttpStatus { status: 429 });
        assert_eq!(
            stablecoin_amount(Decimal::from(49), &RateState::Settled(&failed)),
            PLACEHOLDER
        );
    }

    #[test]
    fn per_request_four_decimals() {
        assert_eq!(
            per_request(Some(Decimal::from(49) / Decimal::from(30_000))).as_deref(),
            Some("≈ ₹0.0016 per request")
        );
        assert_eq!(
            per_request(Some(Decimal::new(6, 4))).as_deref(),
            Some("≈ ₹0.0006 per request")
        );
        assert_eq!(per_request(Some(Decimal::ZERO)), None);
        assert_eq!(per_request(None), None);
    }

    #[test]
    fn annual_note() {
        let note = billed_annually_note(Price::Priced(Decimal::from(49)), BillingPeriod::Annual);
        assert_eq!(note.as_deref(), Some("₹49/mo billed annually"));
        assert_eq!(
            billed_annually_note(Price::Priced(Decimal::from(49)), BillingPeriod::Monthly),
            None
        );
        assert_eq!(billed_annually_note(Price::NeedsCustomQuote, BillingPeriod::Annual), None);
    }

    #[test]
    fn calls_to_action() {
        let catalog = default_catalog();
        assert_eq!(tier_call_to_action(&catalog.tiers()[0]), "Choose Plan");
        assert_eq!(tier_call_to_action(catalog.tiers().last().unwrap()), "Contact Sales");

        let mut free = catalog.tiers()[0].clone();
        free.monthly_price = Price::Priced(Decimal::ZERO);
        assert_eq!(tier_call_to_action(&free), "Get Started Free");
    }

    #[test]
    fn annual_tier_price() {
        let catalog = default_catalog();
        let growth = catalog.popular().unwrap();
        let calc = PriceCalculator::default();
        let annual = tier_price(growth, BillingPeriod::Annual, &calc);
        assert_eq!(annual, Price::Priced(Decimal::from(1_224)));
        assert_eq!(tier_price(growth, BillingPeriod::Monthly, &calc), growth.monthly_price);

        let custom = catalog.tiers().last().unwrap();
        assert_eq!(tier_price(custom, BillingPeriod::Annual, &calc), Price::NeedsCustomQuote);
    }
}
