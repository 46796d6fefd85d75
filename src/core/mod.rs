//! Core business logic abstractions

pub mod alerts;
pub mod config;
pub mod conversion;
pub mod converter;
pub mod currency;
pub mod debounce;
pub mod favorites;
pub mod log;
pub mod metadata;
pub mod series;
pub mod storage;

// Re-export main types for cleaner imports
pub use currency::{CurrencyRateProvider, Pair};
pub use metadata::{CurrencyInfo, CurrencyInfoProvider};
pub use series::{HistoricalRateProvider, RatePoint, SeriesStats};
pub use storage::LocalStorage;
