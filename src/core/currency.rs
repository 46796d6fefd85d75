//! Currency conversion abstractions

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

/// Currencies supported by both the live and the historical rate APIs,
/// mapped to the country whose flag represents them.
pub const SUPPORTED_CURRENCIES: &[(&str, &str)] = &[
    ("AUD", "AU"),
    ("BGN", "BG"),
    ("BRL", "BR"),
    ("CAD", "CA"),
    ("CHF", "CH"),
    ("CNY", "CN"),
    ("CZK", "CZ"),
    ("DKK", "DK"),
    ("EUR", "FR"),
    ("GBP", "GB"),
    ("HKD", "HK"),
    ("HUF", "HU"),
    ("IDR", "ID"),
    ("ILS", "IL"),
    ("INR", "IN"),
    ("ISK", "IS"),
    ("JPY", "JP"),
    ("KRW", "KR"),
    ("MXN", "MX"),
    ("MYR", "MY"),
    ("NOK", "NO"),
    ("NZD", "NZ"),
    ("PHP", "PH"),
    ("PLN", "PL"),
    ("RON", "RO"),
    ("SEK", "SE"),
    ("SGD", "SG"),
    ("THB", "TH"),
    ("TRY", "TR"),
    ("USD", "US"),
    ("ZAR", "ZA"),
];

/// Returns the flag country code for a supported currency.
pub fn country_code(currency: &str) -> Option<&'static str> {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(currency))
        .map(|(_, country)| *country)
}

pub fn is_supported(currency: &str) -> bool {
    country_code(currency).is_some()
}

/// Builds the flag image URL for a currency, e.g. `{base}/US/flat/64.png`.
pub fn flag_url(base_url: &str, currency: &str, size: u32) -> Option<String> {
    country_code(currency)
        .map(|country| format!("{}/{country}/flat/{size}.png", base_url.trim_end_matches('/')))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairError {
    #[error("Unsupported currency: {0}")]
    Unsupported(String),
}

/// An ordered (source, target) currency pair. Deserializing goes through
/// [`Pair::new`], so stored pairs are normalised and validated too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPair")]
pub struct Pair {
    pub from: String,
    pub to: String,
}

#[derive(Deserialize)]
struct RawPair {
    from: String,
    to: String,
}

impl TryFrom<RawPair> for Pair {
    type Error = PairError;

    fn try_from(raw: RawPair) -> std::result::Result<Self, Self::Error> {
        Pair::new(&raw.from, &raw.to)
    }
}

impl Pair {
    pub fn new(from: &str, to: &str) -> std::result::Result<Self, PairError> {
        Ok(Self {
            from: normalize(from)?,
            to: normalize(to)?,
        })
    }

    pub fn swapped(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }

    pub fn with_from(&self, from: &str) -> std::result::Result<Self, PairError> {
        Pair::new(from, &self.to)
    }

    pub fn with_to(&self, to: &str) -> std::result::Result<Self, PairError> {
        Pair::new(&self.from, to)
    }
}

impl Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

fn normalize(code: &str) -> std::result::Result<String, PairError> {
    let code = code.trim().to_uppercase();
    if is_supported(&code) {
        Ok(code)
    } else {
        Err(PairError::Unsupported(code))
    }
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    /// Units of `to` per one unit of `from`.
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64>;
}
