use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::currency::CurrencyRateProvider;

/// Latest rates from ExchangeRate-API (`/v6/{key}/latest/{base}`).
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: String,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
}

/// The request URL carries the API key, so it is stripped from errors.
fn request_error(e: reqwest::Error, from: &str) -> anyhow::Error {
    anyhow!("Request error: {} for currency: {}", e.without_url(), from)
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateApiProvider {
    #[instrument(name = "LatestRateFetch", skip(self))]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        if self.api_key.is_empty() {
            bail!("No exchange rate API key configured (set providers.exchange_rate.api_key)");
        }

        let url = format!("{}/v6/{}/latest/{}", self.base_url, self.api_key, from);
        debug!("Requesting latest rates for {} from {}", from, self.base_url);

        let client = reqwest::Client::builder().user_agent("fxc/0.1").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(e, from))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| request_error(e, from))?;

        let data: LatestRatesResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                return Err(anyhow!("HTTP error: {} for currency: {}", status, from));
            }
            Err(e) => {
                return Err(anyhow!("Failed to parse JSON response for {}: {}", from, e));
            }
        };

        if data.result == "error" {
            return Err(anyhow!(
                "Exchange rate API error: {}",
                data.error_type.as_deref().unwrap_or("unknown")
            ));
        }

        data.conversion_rates
            .get(to)
            .copied()
            .ok_or_else(|| anyhow!("No rate found for currency pair: {}/{}", from, to))
    }
}
