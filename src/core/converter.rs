//! State of the converter form: the selected pair, the amount being typed,
//! the displayed result and the session's recent conversions.

use crate::core::conversion::{
    AmountError, ConversionHistory, ConversionRecord, convert, format_amount, parse_amount,
};
use crate::core::currency::{CurrencyRateProvider, Pair};
use anyhow::{Result, anyhow};
use chrono::{DateTime, Local};
use tracing::{debug, error, instrument};

pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch exchange rate. Please try again.";

#[derive(Debug, Clone)]
pub struct Converter {
    pair: Pair,
    amount_input: String,
    amount: Result<f64, AmountError>,
    fetch_error: Option<String>,
    current: Option<ConversionRecord>,
    last_updated: Option<DateTime<Local>>,
    history: ConversionHistory,
}

impl Converter {
    pub fn new(pair: Pair, amount: f64) -> Self {
        let amount_input = format_amount(amount);
        Self {
            pair,
            amount: parse_amount(&amount_input),
            amount_input,
            fetch_error: None,
            current: None,
            last_updated: None,
            history: ConversionHistory::new(),
        }
    }

    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    pub fn amount_input(&self) -> &str {
        &self.amount_input
    }

    pub fn amount(&self) -> Option<f64> {
        self.amount.as_ref().ok().copied()
    }

    /// The message to show under the form, validation first.
    pub fn error(&self) -> Option<String> {
        match &self.amount {
            Err(e) => Some(e.to_string()),
            Ok(_) => self.fetch_error.clone(),
        }
    }

    pub fn current(&self) -> Option<&ConversionRecord> {
        self.current.as_ref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    pub fn history(&self) -> &ConversionHistory {
        &self.history
    }

    /// Conversion is blocked while the amount field is invalid.
    pub fn can_convert(&self) -> bool {
        self.amount.is_ok()
    }

    /// Updates the amount field. A fetch error is cleared by any edit.
    pub fn set_amount(&mut self, input: &str) -> Result<f64, AmountError> {
        self.amount_input = input.trim().to_string();
        self.amount = parse_amount(&self.amount_input);
        self.fetch_error = None;
        self.amount.clone()
    }

    /// Returns whether the pair changed.
    pub fn set_pair(&mut self, pair: Pair) -> bool {
        if self.pair == pair {
            return false;
        }
        debug!(from = %self.pair, to = %pair, "Pair changed");
        self.pair = pair;
        true
    }

    pub fn swap(&mut self) {
        self.pair = self.pair.swapped();
    }

    /// Fetches the current rate and converts the amount. On failure the
    /// displayed result is cleared and the generic fetch message is kept.
    #[instrument(name = "ConverterRefresh", skip(self, provider), fields(pair = %self.pair))]
    pub async fn refresh(
        &mut self,
        provider: &dyn CurrencyRateProvider,
    ) -> Result<&ConversionRecord> {
        let amount = self.amount.clone()?;

        let record = match provider.get_rate(&self.pair.from, &self.pair.to).await {
            Ok(rate) => convert(amount, rate).map(|result| ConversionRecord {
                from: self.pair.from.clone(),
                to: self.pair.to.clone(),
                amount,
                result,
                rate,
                timestamp: Local::now(),
            }),
            Err(e) => Err(e),
        };

        match record {
            Ok(record) => {
                self.fetch_error = None;
                self.last_updated = Some(record.timestamp);
                self.history.push(record.clone());
                Ok(&*self.current.insert(record))
            }
            Err(e) => {
                error!(error = %e, "Error fetching exchange rate");
                self.current = None;
                self.fetch_error = Some(FETCH_ERROR_MESSAGE.to_string());
                Err(anyhow!(FETCH_ERROR_MESSAGE))
            }
        }
    }

    /// Re-displays a history entry without fetching.
    pub fn recall(&mut self, index: usize) -> Option<&ConversionRecord> {
        let record = self.history.get(index)?.clone();
        self.pair = Pair {
            from: record.from.clone(),
            to: record.to.clone(),
        };
        self.amount_input = format_amount(record.amount);
        self.amount = Ok(record.amount);
        self.fetch_error = None;
        Some(&*self.current.insert(record))
    }
}
