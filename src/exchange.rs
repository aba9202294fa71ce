//! Stablecoin exchange rate: one best-effort fetch, then read-only.
//!
//! ## Lifecycle
//!
//! ```text
//! ExchangeRateCell::new()          state() == Pending
//!        │
//!        ├─ provider.spawn(cell)   background GET, bounded by timeout
//!        │
//!        └─ settles exactly once   state() == Settled(Available | Unavailable)
//! ```
//!
//! Nothing ever waits on the fetch. Prices are computed independently of it
//! and any formatting done while the cell is `Pending` shows the same
//! placeholder as a failed fetch. There is no retry, refresh or expiry: the
//! first outcome is kept for the life of the process.

use crate::config::RateSourceConfig;
use crate::error::{PricingError, RateFetchError};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Decimal places shown for stablecoin amounts.
const STABLECOIN_DP: u32 = 2;

/// The stablecoin and local currency a rate converts between.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub asset: String,
    pub vs_currency: String,
}

impl From<&RateSourceConfig> for CurrencyPair {
    fn from(source: &RateSourceConfig) -> Self {
        Self {
            asset: source.asset_id.clone(),
            vs_currency: source.vs_currency.clone(),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.asset, self.vs_currency)
    }
}

/// Outcome of the single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RateValue {
    /// Local currency units per one stablecoin. Always positive.
    Available(Decimal),
    /// The fetch failed; conversions render a placeholder.
    Unavailable(RateFetchError),
}

/// A settled exchange rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub pair: CurrencyPair,
    pub value: RateValue,
    pub fetched_at: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn available(pair: CurrencyPair, rate: Decimal) -> Self {
        Self {
            pair,
            value: RateValue::Available(rate),
            fetched_at: Utc::now(),
        }
    }

    pub fn unavailable(pair: CurrencyPair, reason: RateFetchError) -> Self {
        Self {
            pair,
            value: RateValue::Unavailable(reason),
            fetched_at: Utc::now(),
        }
    }

    pub fn rate(&self) -> Option<Decimal> {
        match &self.value {
            RateValue::Available(rate) => Some(*rate),
            RateValue::Unavailable(_) => None,
        }
    }

    /// `amount_in_local / rate`, rounded to cents. `None` when unavailable.
    pub fn convert(&self, amount_in_local: Decimal) -> Option<Decimal> {
        let rate = self.rate()?;
        amount_in_local
            .checked_div(rate)
            .map(|v| {
                v.round_dp_with_strategy(STABLECOIN_DP, RoundingStrategy::MidpointAwayFromZero)
            })
    }
}

/// What a reader sees when it looks at the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateState<'a> {
    /// The fetch has not settled yet.
    Pending,
    Settled(&'a ExchangeRate),
}

impl<'a> RateState<'a> {
    pub fn rate(&self) -> Option<Decimal> {
        match self {
            RateState::Pending => None,
            RateState::Settled(rate) => rate.rate(),
        }
    }

    /// Pending and unavailable both convert to `None`.
    pub fn convert(&self, amount_in_local: Decimal) -> Option<Decimal> {
        match self {
            RateState::Pending => None,
            RateState::Settled(rate) => rate.convert(amount_in_local),
        }
    }
}

/// Write-once, shareable holder of the session's exchange rate.
///
/// Cloning shares the same slot. The first [`ExchangeRateCell::set`] wins;
/// later writes are ignored. The cell also records whether a fetch has been
/// claimed for it, so a session sends at most one request.
#[derive(Debug, Clone, Default)]
pub struct ExchangeRateCell {
    slot: Arc<OnceCell<ExchangeRate>>,
    fetch_claimed: Arc<AtomicBool>,
}

impl ExchangeRateCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cell that is already settled.
    pub fn settled(rate: ExchangeRate) -> Self {
        let cell = Self::new();
        cell.set(rate);
        cell
    }

    /// Store the outcome. Returns `false` if the cell was already settled.
    pub fn set(&self, rate: ExchangeRate) -> bool {
        match self.slot.set(rate) {
            Ok(()) => true,
            Err(rejected) => {
                debug!(
                    "Exchange rate for {} already settled; ignoring later value",
                    rejected.pair
                );
                false
            }
        }
    }

    pub fn state(&self) -> RateState<'_> {
        match self.slot.get() {
            Some(rate) => RateState::Settled(rate),
            None => RateState::Pending,
        }
    }

    pub fn get(&self) -> Option<&ExchangeRate> {
        self.slot.get()
    }

    pub fn is_settled(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Reserve the one fetch for this cell.
    ///
    /// `true` for exactly one caller across all clones, and never once the
    /// cell has settled.
    pub fn claim_fetch(&self) -> bool {
        !self.is_settled() && !self.fetch_claimed.swap(true, Ordering::AcqRel)
    }
}

/// Fetches the rate from a CoinGecko-style `simple/price` endpoint.
#[derive(Debug, Clone)]
pub struct ExchangeRateProvider {
    client: reqwest::Client,
    source: RateSourceConfig,
}

impl ExchangeRateProvider {
    pub fn new(source: RateSourceConfig) -> Result<Self, PricingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(source.timeout_secs))
            .build()
            .map_err(|e| PricingError::HttpClient {
                endpoint: source.endpoint.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, source })
    }

    pub fn source(&self) -> &RateSourceConfig {
        &self.source
    }

    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::from(&self.source)
    }

    /// One GET, no retry. Every failure mode maps to a [`RateFetchError`].
    pub async fn fetch_rate(&self) -> Result<Decimal, RateFetchError> {
        let url = self.source.price_url();
        let asset = self.source.asset_id.as_str();
        let vs_currency = self.source.vs_currency.as_str();

        let response = self
            .client
            .get(&url)
            .query(&[("ids", asset), ("vs_currencies", vs_currency)])
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        if !response.status().is_success() {
            return Err(RateFetchError::HttpStatus {
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        parse_rate(&body, asset, vs_currency)
    }

    /// Fetch and wrap the outcome; never fails.
    pub async fn fetch(&self) -> ExchangeRate {
        info!(
            "Fetching {} exchange rate from {}",
            self.pair(),
            self.source.endpoint
        );
        match self.fetch_rate().await {
            Ok(rate) => {
                info!("Exchange rate {} = {}", self.pair(), rate);
                ExchangeRate::available(self.pair(), rate)
            }
            Err(e) => {
                warn!("Exchange rate unavailable for this session: {}", e);
                ExchangeRate::unavailable(self.pair(), e)
            }
        }
    }

    /// Run [`Self::fetch`] in the background and settle `cell` with the result.
    ///
    /// Only the first spawn against a cell (or any of its clones) sends a
    /// request; later calls get a handle that completes immediately.
    /// Must be called from within a tokio runtime.
    pub fn spawn(self, cell: ExchangeRateCell) -> JoinHandle<()> {
        if !cell.claim_fetch() {
            debug!(
                "Exchange rate fetch for {} already started; not requesting again",
                self.pair()
            );
            return tokio::spawn(async {});
        }
        tokio::spawn(async move {
            let rate = self.fetch().await;
            cell.set(rate);
        })
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> RateFetchError {
        if e.is_timeout() {
            RateFetchError::Timeout {
                url: url.to_string(),
                secs: self.source.timeout_secs,
            }
        } else {
            RateFetchError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

/// Extract `body[asset][vs_currency]` as an exact decimal.
///
/// The JSON number is re-parsed from its literal text so `83.27` stays
/// `83.27` rather than passing through `f64`.
pub fn parse_rate(body: &[u8], asset: &str, vs_currency: &str) -> Result<Decimal, RateFetchError> {
    let json: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| RateFetchError::MalformedResponse {
            detail: e.to_string(),
        })?;

    let missing = || RateFetchError::MissingRate {
        asset: asset.to_string(),
        vs_currency: vs_currency.to_string(),
    };

    let number = json
        .get(asset)
        .and_then(|v| v.get(vs_currency))
        .and_then(serde_json::Value::as_number)
        .ok_or_else(missing)?;

    let literal = number.to_string();
    let rate = Decimal::from_str(&literal)
        .or_else(|_| Decimal::from_scientific(&literal))
        .map_err(|e| RateFetchError::MalformedResponse {
            detail: format!("rate '{literal}' is not a decimal: {e}"),
        })?;

    if rate <= Decimal::ZERO {
        return Err(RateFetchError::NonPositiveRate { value: literal });
    }
    Ok(rate)
}
