use async_trait::async_trait;

/// Number of countries listed before the remainder is summarised.
pub const MAX_LISTED_COUNTRIES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyInfo {
    pub code: String,
    pub name: String,
    pub countries: Vec<String>,
}

impl CurrencyInfo {
    /// "A, B, C, D, E and 3 more countries"
    pub fn countries_summary(&self) -> String {
        let listed = self
            .countries
            .iter()
            .take(MAX_LISTED_COUNTRIES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let remaining = self.countries.len().saturating_sub(MAX_LISTED_COUNTRIES);
        if remaining > 0 {
            format!("{listed} and {remaining} more countries")
        } else {
            listed
        }
    }
}

#[async_trait]
pub trait CurrencyInfoProvider: Send + Sync {
    async fn fetch_info(&self, code: &str) -> anyhow::Result<CurrencyInfo>;
}
