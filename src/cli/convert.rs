use super::{AppContext, alerts, chart, info, ui};
use crate::core::conversion::{ConversionRecord, format_amount, parse_amount};
use crate::core::converter::Converter;
use crate::core::favorites::Favorites;
use crate::core::{CurrencyInfo, Pair};
use anyhow::Result;
use chrono::{DateTime, Local};
use comfy_table::Cell;

/// Result table for one conversion.
pub fn render_conversion(record: &ConversionRecord, last_updated: Option<DateTime<Local>>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Amount"),
        ui::header_cell("Exchange Rate"),
        ui::header_cell(&format!("Converted Amount ({})", record.to)),
    ]);
    table.add_row(vec![
        ui::number_cell(format!("{} {}", format_amount(record.amount), record.from)),
        Cell::new(format!(
            "1 {} = {:.4} {}",
            record.from,
            record.effective_rate(),
            record.to
        )),
        ui::value_cell(format!("{:.2} {}", record.result, record.to)),
    ]);

    let mut output = table.to_string();
    if let Some(updated) = last_updated {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!("Last updated: {}", updated.format("%H:%M:%S")),
                ui::StyleType::Subtle
            )
        ));
    }
    output
}

fn print_info_sections(infos: [Option<CurrencyInfo>; 2], flags_base_url: &str) {
    for info in infos.into_iter().flatten() {
        println!("\n{}", info::render_info(&info, flags_base_url));
    }
}

pub async fn run(ctx: &AppContext, pair: Pair, amount: &str, show_chart: bool) -> Result<()> {
    let amount = match parse_amount(amount) {
        Ok(amount) => amount,
        Err(e) => {
            println!("{}", ui::style_text(&format!("⚠ {e}"), ui::StyleType::Error));
            return Ok(());
        }
    };
    let mut converter = Converter::new(pair.clone(), amount);
    let providers = &ctx.providers;
    let days = ctx.config.history_days;

    let pb = ui::new_spinner("Fetching exchange rate...");
    let (conversion, from_info, to_info, history) = futures::join!(
        async {
            converter
                .refresh(&providers.rates)
                .await
                .map(|record| record.clone())
        },
        info::fetch_info(&providers.info, &pair.from),
        info::fetch_info(&providers.info, &pair.to),
        async {
            if show_chart {
                Some(chart::fetch_history(&providers.series, &pair, days).await)
            } else {
                None
            }
        },
    );
    pb.finish_and_clear();

    println!(
        "Convert: {}\n",
        ui::style_text(&pair.to_string(), ui::StyleType::Title)
    );
    match conversion {
        Ok(record) => {
            println!("{}", render_conversion(&record, converter.last_updated()));
            let favorites = Favorites::load(ctx.storage.as_ref())?;
            if favorites.contains(&pair) {
                println!("{}", ui::style_text("✓ Saved pair", ui::StyleType::Subtle));
            }
            alerts::print_triggered(ctx.storage.as_ref(), &pair, record.rate)?;
        }
        Err(e) => println!("{}", ui::style_text(&format!("⚠ {e}"), ui::StyleType::Error)),
    }

    print_info_sections([from_info, to_info], &providers.flags_base_url);

    if let Some(history) = history {
        ui::print_separator();
        match history {
            Ok(points) => println!("{}", chart::render_history(&pair, &points, days)),
            Err(message) => println!("{}", ui::style_text(message, ui::StyleType::Error)),
        }
    }
    Ok(())
}
