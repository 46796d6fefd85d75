use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxc::AppCommand;
use fxc::cli::alerts::AlertAction;
use fxc::cli::favorites::FavoriteAction;
use fxc::core::Pair;
use fxc::core::alerts::AlertDirection;
use fxc::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        from: String,
        to: String,
        /// Amount to convert (defaults to the configured amount)
        amount: Option<String>,
        /// Also show the historical rate chart
        #[arg(long)]
        chart: bool,
    },
    /// Show the historical rate chart for a pair
    Chart {
        from: String,
        to: String,
        /// Number of days to cover
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Show currency name and the countries using it
    Info {
        #[arg(required = true)]
        codes: Vec<String>,
    },
    /// List supported currencies
    Currencies,
    /// Manage favorite currency pairs
    Favorites {
        #[command(subcommand)]
        action: Option<FavoriteCommand>,
    },
    /// Manage rate alerts
    Alerts {
        #[command(subcommand)]
        action: Option<AlertCommand>,
    },
    /// Start an interactive converter
    Session {
        from: Option<String>,
        to: Option<String>,
        #[arg(short, long, allow_negative_numbers = true)]
        amount: Option<f64>,
    },
}

#[derive(Subcommand)]
enum FavoriteCommand {
    /// List favorite pairs
    List,
    /// Save a pair
    Add { from: String, to: String },
    /// Remove a saved pair
    Remove { from: String, to: String },
}

#[derive(Subcommand)]
enum AlertCommand {
    /// List alerts, optionally for one pair
    List {
        from: Option<String>,
        to: Option<String>,
    },
    /// Alert when the rate goes above or below a target
    Add {
        from: String,
        to: String,
        /// `above` or `below`
        direction: AlertDirection,
        target_rate: f64,
    },
    /// Remove an alert by id
    Remove { id: u64 },
}

fn optional_pair(from: Option<String>, to: Option<String>) -> Result<Option<Pair>> {
    match (from, to) {
        (Some(from), Some(to)) => Ok(Some(Pair::new(&from, &to)?)),
        (None, None) => Ok(None),
        _ => anyhow::bail!("Both FROM and TO currencies are required"),
    }
}

impl TryFrom<Commands> for AppCommand {
    type Error = anyhow::Error;

    fn try_from(cmd: Commands) -> Result<AppCommand> {
        let command = match cmd {
            Commands::Convert {
                from,
                to,
                amount,
                chart,
            } => AppCommand::Convert {
                pair: Pair::new(&from, &to)?,
                amount,
                chart,
            },
            Commands::Chart { from, to, days } => AppCommand::Chart {
                pair: Pair::new(&from, &to)?,
                days,
            },
            Commands::Info { codes } => AppCommand::Info { codes },
            Commands::Currencies => AppCommand::Currencies,
            Commands::Favorites { action } => AppCommand::Favorites(match action {
                None | Some(FavoriteCommand::List) => FavoriteAction::List,
                Some(FavoriteCommand::Add { from, to }) => {
                    FavoriteAction::Add(Pair::new(&from, &to)?)
                }
                Some(FavoriteCommand::Remove { from, to }) => {
                    FavoriteAction::Remove(Pair::new(&from, &to)?)
                }
            }),
            Commands::Alerts { action } => AppCommand::Alerts(match action {
                None => AlertAction::List(None),
                Some(AlertCommand::List { from, to }) => AlertAction::List(optional_pair(from, to)?),
                Some(AlertCommand::Add {
                    from,
                    to,
                    direction,
                    target_rate,
                }) => AlertAction::Add {
                    pair: Pair::new(&from, &to)?,
                    direction,
                    target_rate,
                },
                Some(AlertCommand::Remove { id }) => AlertAction::Remove(id),
            }),
            Commands::Session { from, to, amount } => AppCommand::Session {
                pair: optional_pair(from, to)?,
                amount,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        };
        Ok(command)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => fxc::cli::setup::setup_at_path(path),
            None => fxc::cli::setup::setup(),
        },
        Some(cmd) => match AppCommand::try_from(cmd) {
            Ok(command) => fxc::run_command(command, cli.config_path.as_deref()).await,
            Err(e) => Err(e),
        },
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
