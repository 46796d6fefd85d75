//! Interactive converter: the terminal counterpart of the converter form.
//!
//! Amount edits are debounced; pair changes fetch immediately. The
//! session's history lives only as long as the session.

use super::{AppContext, alerts, chart, convert, favorites, info, ui};
use crate::core::alerts::{AlertBook, AlertDirection};
use crate::core::conversion::{default_export_file_name, format_amount};
use crate::core::converter::Converter;
use crate::core::debounce::{self, Debouncer};
use crate::core::favorites::{Favorites, add_favorite, remove_favorite};
use crate::core::Pair;
use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, Utc};
use comfy_table::Cell;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

fn help_text(days: u32) -> String {
    format!(
        "\
Commands:
  <amount>              set the amount (converts after a short pause)
  from CODE | to CODE   change the source or target currency
  swap                  swap source and target
  refresh               fetch the rate again
  history               show recent conversions
  recall N              reuse recent conversion N
  fav | unfav           save or remove the current pair
  favs                  list favorite pairs
  use N                 switch to favorite pair N
  alert above|below R   alert when the rate crosses R
  alerts                list alerts for the current pair
  unalert ID            remove an alert
  chart                 show the {days}-day rate chart
  info                  show currency information
  export [PATH]         write recent conversions to CSV
  help | quit"
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Amount(String),
    From(String),
    To(String),
    Swap,
    Refresh,
    History,
    Recall(usize),
    Fav,
    Unfav,
    Favs,
    Use(usize),
    Alert {
        direction: AlertDirection,
        target_rate: String,
    },
    Alerts,
    Unalert(u64),
    Chart,
    Info,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

fn required<'a>(arg: Option<&'a str>, usage: &str) -> Result<&'a str> {
    arg.ok_or_else(|| anyhow!("Usage: {usage}"))
}

fn index_arg(arg: Option<&str>, usage: &str) -> Result<usize> {
    let value = required(arg, usage)?;
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => bail!("Invalid number: {value}"),
    }
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | '+')) {
            return Ok(SessionCommand::Amount(line.to_string()));
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next();
        let command = match command.as_str() {
            "amount" => SessionCommand::Amount(arg.unwrap_or_default().to_string()),
            "from" => SessionCommand::From(required(arg, "from CODE")?.to_string()),
            "to" => SessionCommand::To(required(arg, "to CODE")?.to_string()),
            "swap" => SessionCommand::Swap,
            "refresh" | "r" => SessionCommand::Refresh,
            "history" => SessionCommand::History,
            "recall" => SessionCommand::Recall(index_arg(arg, "recall N")?),
            "fav" => SessionCommand::Fav,
            "unfav" => SessionCommand::Unfav,
            "favs" | "favorites" => SessionCommand::Favs,
            "use" => SessionCommand::Use(index_arg(arg, "use N")?),
            "alert" => {
                let direction = required(arg, "alert above|below RATE")?.parse()?;
                let target_rate = required(parts.next(), "alert above|below RATE")?;
                SessionCommand::Alert {
                    direction,
                    target_rate: target_rate.to_string(),
                }
            }
            "alerts" => SessionCommand::Alerts,
            "unalert" => {
                let id = required(arg, "unalert ID")?;
                SessionCommand::Unalert(
                    id.parse()
                        .map_err(|_| anyhow!("Invalid alert id: {id}"))?,
                )
            }
            "chart" => SessionCommand::Chart,
            "info" => SessionCommand::Info,
            "export" => SessionCommand::Export(
                line.split_once(char::is_whitespace)
                    .map(|(_, path)| path.trim())
                    .filter(|path| !path.is_empty())
                    .map(PathBuf::from),
            ),
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => bail!("Unknown command: {other} (type `help`)"),
        };
        Ok(command)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<'a> {
    ctx: &'a AppContext,
    converter: Converter,
    debouncer: Debouncer<()>,
}

impl<'a> Session<'a> {
    pub fn new(ctx: &'a AppContext, pair: Pair, amount: f64) -> Self {
        Self {
            ctx,
            converter: Converter::new(pair, amount),
            debouncer: Debouncer::new(ctx.config.debounce()),
        }
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn has_pending_fetch(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn print_error(message: &str) {
        println!("{}", ui::style_text(&format!("⚠ {message}"), ui::StyleType::Error));
    }

    /// Fetches the rate for the current pair and amount and prints the result.
    pub async fn fetch_now(&mut self) {
        self.debouncer.cancel();
        let pb = ui::new_spinner("Updating...");
        let result = self
            .converter
            .refresh(&self.ctx.providers.rates)
            .await
            .map(|record| record.clone());
        pb.finish_and_clear();

        match result {
            Ok(record) => {
                println!(
                    "{}",
                    convert::render_conversion(&record, self.converter.last_updated())
                );
                if let Err(e) =
                    alerts::print_triggered(self.ctx.storage.as_ref(), self.converter.pair(), record.rate)
                {
                    Self::print_error(&e.to_string());
                }
            }
            Err(e) => Self::print_error(&e.to_string()),
        }
    }

    async fn change_pair(&mut self, pair: Pair) {
        if self.converter.set_pair(pair) {
            println!("Pair: {}", ui::style_text(&self.converter.pair().to_string(), ui::StyleType::Title));
            if self.converter.can_convert() {
                self.fetch_now().await;
            }
        }
    }

    fn print_history(&self) {
        let history = self.converter.history();
        if history.is_empty() {
            println!("No recent conversions.");
            return;
        }
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("#"),
            ui::header_cell("Conversion"),
            ui::header_cell("Rate"),
            ui::header_cell("Time"),
        ]);
        for (i, record) in history.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(format!(
                    "{} {} → {:.2} {}",
                    format_amount(record.amount),
                    record.from,
                    record.result,
                    record.to
                )),
                ui::number_cell(record.rate.to_string()),
                Cell::new(record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            ]);
        }
        println!("Recent Conversions\n{table}");
    }

    pub async fn execute(&mut self, command: SessionCommand) -> Result<Flow> {
        debug!(?command, "Session command");
        let ctx = self.ctx;
        let storage = ctx.storage.as_ref();
        match command {
            SessionCommand::Amount(input) => match self.converter.set_amount(&input) {
                Ok(_) => self.debouncer.schedule(()),
                Err(e) => {
                    self.debouncer.cancel();
                    Self::print_error(&e.to_string());
                }
            },
            SessionCommand::From(code) => {
                let pair = self.converter.pair().with_from(&code)?;
                self.change_pair(pair).await;
            }
            SessionCommand::To(code) => {
                let pair = self.converter.pair().with_to(&code)?;
                self.change_pair(pair).await;
            }
            SessionCommand::Swap => {
                let pair = self.converter.pair().swapped();
                self.change_pair(pair).await;
            }
            SessionCommand::Refresh => {
                if !self.converter.can_convert() {
                    bail!(self.converter.error().unwrap_or_default());
                }
                self.fetch_now().await;
            }
            SessionCommand::History => self.print_history(),
            SessionCommand::Recall(n) => {
                let previous_pair = self.converter.pair().clone();
                let previous_amount = self.converter.amount();
                let record = self
                    .converter
                    .recall(n - 1)
                    .cloned()
                    .ok_or_else(|| anyhow!("No recent conversion #{n}"))?;
                println!("{}", convert::render_conversion(&record, None));

                // The stored rate may be stale: refetch as a pair or amount edit would
                if record.from != previous_pair.from || record.to != previous_pair.to {
                    self.fetch_now().await;
                } else if previous_amount != Some(record.amount) {
                    self.debouncer.schedule(());
                } else {
                    self.debouncer.cancel();
                }
            }
            SessionCommand::Fav => {
                let pair = self.converter.pair().clone();
                if add_favorite(storage, pair.clone())? {
                    println!("★ Added {pair} to favorites");
                } else {
                    println!("✓ {pair} is already saved");
                }
            }
            SessionCommand::Unfav => {
                let pair = self.converter.pair().clone();
                if remove_favorite(storage, &pair)? {
                    println!("Removed {pair} from favorites");
                } else {
                    println!("{pair} is not a favorite");
                }
            }
            SessionCommand::Favs => {
                let favs = Favorites::load(storage)?;
                match favorites::render_favorites(&favs, Some(self.converter.pair())) {
                    Some(table) => println!("Favorite Pairs\n{table}"),
                    None => println!("No favorite pairs yet. Add current pair with `fav`."),
                }
            }
            SessionCommand::Use(n) => {
                let favs = Favorites::load(storage)?;
                let pair = favs
                    .get(n - 1)
                    .cloned()
                    .ok_or_else(|| anyhow!("No favorite pair #{n}"))?;
                self.change_pair(pair).await;
            }
            SessionCommand::Alert {
                direction,
                target_rate,
            } => {
                let target_rate: f64 = target_rate
                    .parse()
                    .map_err(|_| anyhow!("Target rate must be a positive number"))?;
                let mut book = AlertBook::load(storage)?;
                let alert = book
                    .add(self.converter.pair(), target_rate, direction, Utc::now())?
                    .clone();
                book.save(storage)?;
                println!("Alert {} set: when {}", alert.id, alert.describe());
            }
            SessionCommand::Alerts => {
                let book = AlertBook::load(storage)?;
                match alerts::render_alerts(book.for_pair(self.converter.pair())) {
                    Some(table) => println!("Rate Alerts\n{table}"),
                    None => println!("No alerts set for this pair."),
                }
            }
            SessionCommand::Unalert(id) => {
                let mut book = AlertBook::load(storage)?;
                if !book.remove(id) {
                    bail!("No alert with id {id}");
                }
                book.save(storage)?;
                println!("Removed alert {id}");
            }
            SessionCommand::Chart => {
                chart::run(
                    &ctx.providers.series,
                    self.converter.pair(),
                    ctx.config.history_days,
                )
                .await?;
            }
            SessionCommand::Info => {
                let pair = self.converter.pair();
                info::run(
                    &ctx.providers.info,
                    &[pair.from.clone(), pair.to.clone()],
                    &ctx.providers.flags_base_url,
                )
                .await?;
            }
            SessionCommand::Export(path) => {
                let path = path
                    .unwrap_or_else(|| PathBuf::from(default_export_file_name(Local::now().date_naive())));
                let rows = self.converter.history().export_csv(&path)?;
                println!("Exported {rows} conversions to {}", path.display());
            }
            SessionCommand::Help => println!("{}", help_text(ctx.config.history_days)),
            SessionCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Parses and runs one input line; command failures are printed, not
    /// propagated.
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        if line.trim().is_empty() {
            return Flow::Continue;
        }
        let result = match line.parse::<SessionCommand>() {
            Ok(command) => self.execute(command).await,
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            Self::print_error(&e.to_string());
            Flow::Continue
        })
    }

    /// Runs a fetch whose debounce period has elapsed.
    pub async fn fire_debounced(&mut self) {
        if self.debouncer.take_ready().is_some() {
            self.fetch_now().await;
        }
    }
}

fn print_prompt() -> Result<()> {
    print!("{} ", ui::style_text(">", ui::StyleType::Subtle));
    std::io::stdout().flush().context("Failed to flush stdout")
}

pub async fn run(ctx: &AppContext, pair: Pair, amount: f64) -> Result<()> {
    let mut session = Session::new(ctx, pair, amount);
    println!(
        "Currency Converter: {} (amount {}). Type `help` for commands.",
        ui::style_text(&session.converter.pair().to_string(), ui::StyleType::Title),
        session.converter.amount_input()
    );
    if session.converter.can_convert() {
        session.fetch_now().await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_prompt()?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                if session.handle_line(&line).await == Flow::Quit {
                    break;
                }
                print_prompt()?;
            }
            _ = debounce::wait_for(session.debouncer.deadline()) => {
                println!();
                session.fire_debounced().await;
                print_prompt()?;
            }
        }
    }
    Ok(())
}
