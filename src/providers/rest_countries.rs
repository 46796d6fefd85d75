use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::metadata::{CurrencyInfo, CurrencyInfoProvider};

/// Currency names and the countries using them, from REST Countries.
pub struct RestCountriesProvider {
    base_url: String,
}

impl RestCountriesProvider {
    pub fn new(base_url: &str) -> Self {
        RestCountriesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Country {
    name: CountryName,
    #[serde(default)]
    currencies: HashMap<String, CountryCurrency>,
}

#[derive(Debug, Deserialize)]
struct CountryName {
    common: String,
}

#[derive(Debug, Deserialize)]
struct CountryCurrency {
    name: String,
}

#[async_trait]
impl CurrencyInfoProvider for RestCountriesProvider {
    #[instrument(name = "CurrencyInfoFetch", skip(self))]
    async fn fetch_info(&self, code: &str) -> Result<CurrencyInfo> {
        let url = format!("{}/v3.1/currency/{}", self.base_url, code);
        debug!("Requesting currency info from {}", url);

        let client = reqwest::Client::builder().user_agent("fxc/0.1").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for currency: {}", e, code))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency: {}",
                response.status(),
                code
            ));
        }

        let text = response.text().await?;
        let countries: Vec<Country> = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", code, e))?;

        let first = countries
            .first()
            .ok_or_else(|| anyhow!("No countries found for currency: {}", code))?;
        let name = first
            .currencies
            .get(code)
            .map(|c| c.name.clone())
            .unwrap_or_default();

        Ok(CurrencyInfo {
            code: code.to_string(),
            name,
            countries: countries.into_iter().map(|c| c.name.common).collect(),
        })
    }
}
