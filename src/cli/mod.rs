pub mod alerts;
pub mod chart;
pub mod convert;
pub mod favorites;
pub mod info;
pub mod session;
pub mod setup;
pub mod ui;

use crate::core::LocalStorage;
use crate::core::config::AppConfig;
use crate::providers::Providers;

/// Everything a command needs: config, HTTP providers and local storage.
pub struct AppContext {
    pub config: AppConfig,
    pub providers: Providers,
    pub storage: Box<dyn LocalStorage>,
}

impl AppContext {
    pub fn new(config: AppConfig, storage: Box<dyn LocalStorage>) -> Self {
        let providers = Providers::from_config(&config);
        Self {
            config,
            providers,
            storage,
        }
    }
}
