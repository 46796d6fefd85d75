//! Conversion records, the recent-conversions history and its CSV export.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Local, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Maximum number of conversions kept in a session's history.
pub const HISTORY_LIMIT: usize = 5;

pub const CSV_HEADER: [&str; 6] = [
    "Date",
    "From Currency",
    "To Currency",
    "Amount",
    "Converted Amount",
    "Rate",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Please enter an amount")]
    Empty,
    #[error("Please enter a valid number")]
    NotANumber,
    #[error("Amount must be greater than 0")]
    NotPositive,
}

/// Parses the raw amount field.
pub fn parse_amount(input: &str) -> Result<f64, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    let amount: f64 = input.parse().map_err(|_| AmountError::NotANumber)?;
    if !amount.is_finite() {
        return Err(AmountError::NotANumber);
    }
    if amount <= 0.0 {
        return Err(AmountError::NotPositive);
    }
    Ok(amount)
}

/// `amount × rate`, rounded to two decimals with midpoints away from zero.
pub fn convert(amount: f64, rate: f64) -> Result<Decimal> {
    let value = Decimal::from_f64(amount * rate)
        .ok_or_else(|| anyhow!("Cannot convert {amount} at rate {rate}"))?;
    Ok(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Formats an amount the way the user typed it: no trailing zeros.
pub fn format_amount(amount: f64) -> String {
    format!("{amount}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRecord {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub result: Decimal,
    pub rate: f64,
    pub timestamp: DateTime<Local>,
}

impl ConversionRecord {
    /// Rate implied by the rounded result, as shown next to a conversion.
    pub fn effective_rate(&self) -> f64 {
        use rust_decimal::prelude::ToPrimitive;
        self.result.to_f64().unwrap_or(self.rate * self.amount) / self.amount
    }

    fn same_request(&self, other: &ConversionRecord) -> bool {
        self.from == other.from && self.to == other.to && self.amount == other.amount
    }

    fn csv_fields(&self) -> [String; 6] {
        [
            self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            self.from.clone(),
            self.to.clone(),
            format_amount(self.amount),
            format!("{:.2}", self.result),
            self.rate.to_string(),
        ]
    }
}

/// Most-recent-first list of conversions, capped at [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default)]
pub struct ConversionHistory {
    records: Vec<ConversionRecord>,
}

impl ConversionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `record` first, dropping an older entry for the same
    /// (from, to, amount) and anything beyond the cap.
    pub fn push(&mut self, record: ConversionRecord) {
        self.records.retain(|r| !r.same_request(&record));
        self.records.insert(0, record);
        self.records.truncate(HISTORY_LIMIT);
    }

    pub fn get(&self, index: usize) -> Option<&ConversionRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        wtr.write_record(CSV_HEADER)?;
        for record in &self.records {
            wtr.write_record(record.csv_fields())?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Writes the history to `path` and returns the number of rows written.
    pub fn export_csv(&self, path: &Path) -> Result<usize> {
        if self.is_empty() {
            bail!("No conversions to export");
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create export file: {}", path.display()))?;
        self.write_csv(file)?;
        debug!(rows = self.len(), path = %path.display(), "Exported history");
        Ok(self.len())
    }
}

pub fn default_export_file_name(date: NaiveDate) -> String {
    format!("currency-conversions-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn record(from: &str, to: &str, amount: f64, rate: f64) -> ConversionRecord {
        ConversionRecord {
            from: from.to_string(),
            to: to.to_string(),
            amount,
            result: convert(amount, rate).unwrap(),
            rate,
            timestamp: Local::now(),
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.5"), Ok(12.5));
        assert_eq!(parse_amount("  3 "), Ok(3.0));
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("abc"), Err(AmountError::NotANumber));
        assert_eq!(parse_amount("0"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("-4"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("inf"), Err(AmountError::NotANumber));
        assert_eq!(
            AmountError::NotPositive.to_string(),
            "Amount must be greater than 0"
        );
    }

    #[test]
    fn test_convert_rounds_to_two_decimals() {
        assert_eq!(convert(100.0, 83.1234).unwrap(), Decimal::from_str("8312.34").unwrap());
        assert_eq!(convert(1.0, 0.125).unwrap(), Decimal::from_str("0.13").unwrap());
        assert_eq!(convert(3.0, 1.5).unwrap(), Decimal::from_str("4.5").unwrap());
        assert_eq!(format!("{:.2}", convert(3.0, 1.5).unwrap()), "4.50");
        assert!(convert(1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_history_is_capped_and_most_recent_first() {
        let mut history = ConversionHistory::new();
        for amount in 1..=7 {
            history.push(record("USD", "INR", amount as f64, 83.0));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        let amounts: Vec<f64> = history.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![7.0, 6.0, 5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_history_replaces_duplicate_request() {
        let mut history = ConversionHistory::new();
        history.push(record("USD", "INR", 10.0, 83.0));
        history.push(record("USD", "EUR", 10.0, 0.9));
        history.push(record("USD", "INR", 10.0, 84.0));

        assert_eq!(history.len(), 2);
        let first = history.get(0).unwrap();
        assert_eq!((first.to.as_str(), first.rate), ("INR", 84.0));
        assert_eq!(history.get(1).unwrap().to, "EUR");
    }

    #[test]
    fn test_csv_has_header_and_one_quoted_line_per_record() {
        let mut history = ConversionHistory::new();
        history.push(record("USD", "INR", 10.0, 83.5));
        history.push(record("EUR", "GBP", 2.5, 0.5));

        let csv = history.to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            r#""Date","From Currency","To Currency","Amount","Converted Amount","Rate""#
        );
        assert!(lines[1].ends_with(r#","EUR","GBP","2.5","1.25","0.5""#));
        assert!(lines[2].ends_with(r#","USD","INR","10","835.00","83.5""#));
        for line in &lines {
            assert!(line.starts_with('"') && line.ends_with('"'));
        }
    }

    #[test]
    fn test_export_writes_file_and_rejects_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        assert!(ConversionHistory::new().export_csv(&path).is_err());
        assert!(!path.exists());

        let mut history = ConversionHistory::new();
        history.push(record("USD", "JPY", 1.0, 150.0));
        assert_eq!(history.export_csv(&path).unwrap(), 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_default_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            default_export_file_name(date),
            "currency-conversions-2024-03-09.csv"
        );
    }
}
