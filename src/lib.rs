pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::AppContext;
use crate::cli::alerts::AlertAction;
use crate::cli::favorites::FavoriteAction;
use crate::core::{LocalStorage, Pair};
use crate::core::config::AppConfig;
use crate::core::conversion::format_amount;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Convert {
        pair: Pair,
        amount: Option<String>,
        chart: bool,
    },
    Chart {
        pair: Pair,
        days: Option<u32>,
    },
    Info {
        codes: Vec<String>,
    },
    Currencies,
    Favorites(FavoriteAction),
    Alerts(AlertAction),
    Session {
        pair: Option<Pair>,
        amount: Option<f64>,
    },
}

fn default_pair(config: &AppConfig) -> Result<Pair> {
    Ok(Pair::new(&config.defaults.from, &config.defaults.to)?)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxc starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(defaults = ?config.defaults, history_days = config.history_days, "Loaded config");

    // Commands that never touch favorites or alerts skip opening storage
    let storage: Box<dyn LocalStorage> = match &command {
        AppCommand::Chart { .. } | AppCommand::Info { .. } | AppCommand::Currencies => {
            Box::new(store::memory::MemoryStorage::new())
        }
        _ => store::open_storage(&config)?,
    };
    let ctx = AppContext::new(config, storage);

    match command {
        AppCommand::Convert {
            pair,
            amount,
            chart,
        } => {
            let amount = amount.unwrap_or_else(|| format_amount(ctx.config.defaults.amount));
            cli::convert::run(&ctx, pair, &amount, chart).await
        }
        AppCommand::Chart { pair, days } => {
            let days = days.unwrap_or(ctx.config.history_days);
            cli::chart::run(&ctx.providers.series, &pair, days).await
        }
        AppCommand::Info { codes } => {
            cli::info::run(&ctx.providers.info, &codes, &ctx.providers.flags_base_url).await
        }
        AppCommand::Currencies => cli::info::run_currencies(&ctx.providers.flags_base_url),
        AppCommand::Favorites(action) => cli::favorites::run(ctx.storage.as_ref(), action),
        AppCommand::Alerts(action) => cli::alerts::run(ctx.storage.as_ref(), action),
        AppCommand::Session { pair, amount } => {
            let pair = match pair {
                Some(pair) => pair,
                None => default_pair(&ctx.config)?,
            };
            let amount = amount.unwrap_or(ctx.config.defaults.amount);
            cli::session::run(&ctx, pair, amount).await
        }
    }
}
