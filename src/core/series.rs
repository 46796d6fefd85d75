//! Historical rate series and their summary statistics

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl SeriesStats {
    pub fn from_points(points: &[RatePoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let (min, max, sum) = points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), p| (min.min(p.rate), max.max(p.rate), sum + p.rate),
        );
        Some(Self {
            min,
            avg: sum / points.len() as f64,
            max,
        })
    }
}

/// Inclusive date window ending at `end` and spanning `days` days back.
pub fn date_window(end: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    (end - Duration::days(i64::from(days)), end)
}

#[async_trait]
pub trait HistoricalRateProvider: Send + Sync {
    /// Daily rates of `to` per `from` between `start` and `end`, oldest first.
    async fn fetch_series(
        &self,
        from: &str,
        to: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RatePoint>>;
}
