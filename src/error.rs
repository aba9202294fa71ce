//! Error types for the tierquote library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PricingError`] — **Fatal**: the engine cannot be constructed at all
//!   (malformed rate schedule, impossible discount, HTTP client that cannot
//!   be built). Returned as `Err(PricingError)` from constructors and
//!   [`crate::config::PricingConfigBuilder::build`].
//!
//! * [`RateFetchError`] — **Non-fatal**: the exchange-rate lookup failed.
//!   Stored inside [`crate::exchange::RateValue::Unavailable`] so prices are
//!   still computed and only the stablecoin estimate degrades to a
//!   placeholder.
//!
//! Nothing on the quote path returns an error: bad volume input is clamped
//! and an exhausted rate schedule is a [`crate::calculator::Price`] variant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All fatal errors returned by the tierquote library.
#[derive(Debug, Error)]
pub enum PricingError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── HTTP client errors ────────────────────────────────────────────────
    /// The reqwest client for the exchange-rate source could not be built.
    #[error("Failed to build HTTP client for '{endpoint}': {reason}")]
    HttpClient { endpoint: String, reason: String },
}

/// Why the exchange rate is unavailable for this session.
///
/// The fetch is attempted exactly once; whichever of these it ends in is
/// kept for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RateFetchError {
    /// Connection refused, DNS failure, TLS error, body read error.
    #[error("Exchange rate request to '{url}' failed: {reason}")]
    Network { url: String, reason: String },

    /// The request exceeded the configured timeout.
    #[error("Exchange rate request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The source answered with a non-2xx status.
    #[error("Exchange rate source returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// The body was not JSON at all.
    #[error("Exchange rate response is not valid JSON: {detail}")]
    MalformedResponse { detail: String },

    /// JSON parsed, but `body[asset][vs_currency]` is absent or not a number.
    #[error("Exchange rate response has no numeric '{asset}.{vs_currency}' field")]
    MissingRate { asset: String, vs_currency: String },

    /// A zero or negative rate cannot be divided by.
    #[error("Exchange rate must be positive, got {value}")]
    NonPositiveRate { value: String },
}

impl RateFetchError {
    /// True for failures where the source was never reached or never answered.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_display() {
        let e = PricingError::InvalidConfig("rate schedule is empty".into());
        assert_eq!(e.to_string(), "Invalid configuration: rate schedule is empty");
    }

    #[test]
    fn timeout_display() {
        let e = RateFetchError::Timeout {
            url: "https://rates.example/simple/price".into(),
            secs: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("10s"), "got: {msg}");
        assert!(msg.contains("rates.example"), "got: {msg}");
        assert!(e.is_transport());
    }

    #[test]
    fn missing_rate_display() {
        let e = RateFetchError::MissingRate {
            asset: "tether".into(),
            vs_currency: "inr".into(),
        };
        assert!(e.to_string().contains("tether.inr"));
        assert!(!e.is_transport());
    }

    #[test]
    fn http_status_display() {
        let e = RateFetchError::HttpStatus { status: 503 };
        assert!(e.to_string().contains("503"));
    }
}
