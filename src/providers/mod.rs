pub mod exchange_rate_api;
pub mod frankfurter;
pub mod rest_countries;

use crate::core::config::AppConfig;
use exchange_rate_api::ExchangeRateApiProvider;
use frankfurter::FrankfurterProvider;
use rest_countries::RestCountriesProvider;

/// The HTTP providers, built from the `providers` section of the config.
pub struct Providers {
    pub rates: ExchangeRateApiProvider,
    pub series: FrankfurterProvider,
    pub info: RestCountriesProvider,
    pub flags_base_url: String,
}

impl Providers {
    pub fn from_config(config: &AppConfig) -> Self {
        let providers = &config.providers;
        Self {
            rates: ExchangeRateApiProvider::new(
                &providers.exchange_rate.base_url,
                &providers.exchange_rate.api_key,
            ),
            series: FrankfurterProvider::new(&providers.frankfurter.base_url),
            info: RestCountriesProvider::new(&providers.rest_countries.base_url),
            flags_base_url: providers.flags.base_url.clone(),
        }
    }
}
