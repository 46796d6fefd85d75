//! Threshold alerts on a pair's rate.

use crate::core::currency::Pair;
use crate::core::storage::{LocalStorage, load_json, save_json};
use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

pub const ALERTS_KEY: &str = "currencyAlerts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Above,
    Below,
}

impl Display for AlertDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AlertDirection::Above => "above",
                AlertDirection::Below => "below",
            }
        )
    }
}

impl FromStr for AlertDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "above" => Ok(AlertDirection::Above),
            "below" => Ok(AlertDirection::Below),
            _ => Err(anyhow!("Invalid alert direction: {} (use above or below)", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateAlert {
    pub id: u64,
    pub from: String,
    pub to: String,
    pub target_rate: f64,
    #[serde(rename = "type")]
    pub direction: AlertDirection,
    pub created_at: DateTime<Utc>,
}

impl RateAlert {
    pub fn matches(&self, pair: &Pair) -> bool {
        self.from == pair.from && self.to == pair.to
    }

    /// True when the alert belongs to `pair` and `rate` crosses its threshold.
    pub fn is_triggered(&self, pair: &Pair, rate: f64) -> bool {
        self.matches(pair)
            && match self.direction {
                AlertDirection::Above => rate >= self.target_rate,
                AlertDirection::Below => rate <= self.target_rate,
            }
    }

    pub fn describe(&self) -> String {
        format!(
            "{}/{} rate is {} {}",
            self.from, self.to, self.direction, self.target_rate
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertBook {
    alerts: Vec<RateAlert>,
}

impl AlertBook {
    pub fn load(storage: &dyn LocalStorage) -> Result<Self> {
        load_json(storage, ALERTS_KEY)
    }

    pub fn save(&self, storage: &dyn LocalStorage) -> Result<()> {
        save_json(storage, ALERTS_KEY, self)
    }

    /// Creates an alert for `pair`. The id is the creation time in
    /// milliseconds, bumped past any id already in use.
    pub fn add(
        &mut self,
        pair: &Pair,
        target_rate: f64,
        direction: AlertDirection,
        now: DateTime<Utc>,
    ) -> Result<&RateAlert> {
        if !target_rate.is_finite() || target_rate <= 0.0 {
            bail!("Target rate must be a positive number");
        }
        let mut id = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        if let Some(max_id) = self.alerts.iter().map(|a| a.id).max() {
            if id <= max_id {
                id = max_id
                    .checked_add(1)
                    .ok_or_else(|| anyhow!("No alert id available after {max_id}"))?;
            }
        }
        self.alerts.push(RateAlert {
            id,
            from: pair.from.clone(),
            to: pair.to.clone(),
            target_rate,
            direction,
            created_at: now,
        });
        debug!(id, %pair, target_rate, %direction, "Added alert");
        self.alerts
            .last()
            .ok_or_else(|| anyhow!("Alert was not stored"))
    }

    /// Returns whether an alert was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    pub fn for_pair<'a>(&'a self, pair: &'a Pair) -> impl Iterator<Item = &'a RateAlert> {
        self.alerts.iter().filter(move |a| a.matches(pair))
    }

    pub fn triggered<'a>(
        &'a self,
        pair: &'a Pair,
        rate: f64,
    ) -> impl Iterator<Item = &'a RateAlert> {
        self.alerts.iter().filter(move |a| a.is_triggered(pair, rate))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RateAlert> {
        self.alerts.iter()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
