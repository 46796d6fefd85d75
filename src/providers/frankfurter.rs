use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

use crate::core::series::{HistoricalRateProvider, RatePoint};

/// Daily reference rates from the Frankfurter API (`/{start}..{end}`).
pub struct FrankfurterProvider {
    base_url: String,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str) -> Self {
        FrankfurterProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    rates: Option<BTreeMap<String, HashMap<String, f64>>>,
    message: Option<String>,
}

#[async_trait]
impl HistoricalRateProvider for FrankfurterProvider {
    #[instrument(name = "SeriesFetch", skip(self))]
    async fn fetch_series(
        &self,
        from: &str,
        to: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>> {
        let url = format!(
            "{}/{}..{}?from={}&to={}",
            self.base_url,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            from,
            to
        );
        debug!("Requesting historical rates from {}", url);

        let client = reqwest::Client::builder().user_agent("fxc/0.1").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for currency pair: {}/{}", e, from, to))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency pair: {}/{}",
                response.status(),
                from,
                to
            ));
        }

        let text = response.text().await?;
        let data: TimeSeriesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}/{}: {}", from, to, e))?;

        if let Some(message) = data.message {
            return Err(anyhow!("Historical rate API error: {}", message));
        }
        let rates = data
            .rates
            .ok_or_else(|| anyhow!("No historical data found for currency pair: {}/{}", from, to))?;

        // Keys are ISO dates, so map order is date order
        let mut points = Vec::with_capacity(rates.len());
        for (date, day_rates) in rates {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("Failed to parse date: {date}"))?;
            match day_rates.get(to) {
                Some(rate) => points.push(RatePoint { date, rate: *rate }),
                None => debug!(%date, "No {} rate on this day", to),
            }
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2024-01-01..2024-01-31"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "INR"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_series_fetch() {
        let mock_response = r#"{
            "amount": 1.0,
            "base": "USD",
            "start_date": "2024-01-02",
            "end_date": "2024-01-31",
            "rates": {
                "2024-01-03": {"INR": 83.25},
                "2024-01-02": {"INR": 83.1},
                "2024-01-04": {"INR": 83.4}
            }
        }"#;
        let mock_server = create_mock_server(200, mock_response).await;
        let provider = FrankfurterProvider::new(&mock_server.uri());

        let points = provider
            .fetch_series("USD", "INR", jan(1), jan(31))
            .await
            .unwrap();
        assert_eq!(
            points,
            vec![
                RatePoint { date: jan(2), rate: 83.1 },
                RatePoint { date: jan(3), rate: 83.25 },
                RatePoint { date: jan(4), rate: 83.4 },
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_series() {
        let mock_server = create_mock_server(200, r#"{"rates": {}}"#).await;
        let provider = FrankfurterProvider::new(&mock_server.uri());

        let points = provider
            .fetch_series("USD", "INR", jan(1), jan(31))
            .await
            .unwrap();
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn test_api_error_message() {
        let mock_server = create_mock_server(200, r#"{"message": "not found"}"#).await;
        let provider = FrankfurterProvider::new(&mock_server.uri());

        let result = provider.fetch_series("USD", "INR", jan(1), jan(31)).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Historical rate API error: not found"
        );
    }

    #[tokio::test]
    async fn test_http_error() {
        let mock_server = create_mock_server(404, "").await;
        let provider = FrankfurterProvider::new(&mock_server.uri());

        let result = provider.fetch_series("USD", "INR", jan(1), jan(31)).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 404 Not Found for currency pair: USD/INR"
        );
    }
}
