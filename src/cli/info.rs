use super::ui;
use crate::core::currency::{self, SUPPORTED_CURRENCIES};
use crate::core::{CurrencyInfo, CurrencyInfoProvider};
use anyhow::{Result, bail};
use comfy_table::Cell;
use futures::future::join_all;
use tracing::error;

/// Fetches metadata for a currency. Failures are logged and yield `None`,
/// so the section is left out.
pub async fn fetch_info(provider: &dyn CurrencyInfoProvider, code: &str) -> Option<CurrencyInfo> {
    match provider.fetch_info(code).await {
        Ok(info) => Some(info),
        Err(e) => {
            error!(error = %e, code, "Error fetching currency info");
            None
        }
    }
}

pub fn render_info(info: &CurrencyInfo, flags_base_url: &str) -> String {
    let mut output = format!(
        "{} Information\n",
        ui::style_text(&info.code, ui::StyleType::Title)
    );
    output.push_str(&format!("  Name:    {}\n", info.name));
    output.push_str(&format!("  Used in: {}", info.countries_summary()));
    if let Some(flag) = currency::flag_url(flags_base_url, &info.code, 64) {
        output.push_str(&format!(
            "\n  Flag:    {}",
            ui::style_text(&flag, ui::StyleType::Subtle)
        ));
    }
    output
}

pub async fn run(provider: &dyn CurrencyInfoProvider, codes: &[String], flags_base_url: &str) -> Result<()> {
    let codes: Vec<String> = codes.iter().map(|c| c.trim().to_uppercase()).collect();
    if codes.is_empty() {
        bail!("No currency codes given");
    }

    let pb = ui::new_spinner("Fetching currency info...");
    let results = join_all(codes.iter().map(|code| fetch_info(provider, code))).await;
    pb.finish_and_clear();

    for (i, (code, info)) in codes.iter().zip(results).enumerate() {
        match info {
            Some(info) => println!("{}", render_info(&info, flags_base_url)),
            None => println!(
                "{}",
                ui::style_text(
                    &format!("Currency information not available for {code}"),
                    ui::StyleType::Error
                )
            ),
        }
        if i + 1 < codes.len() {
            println!();
        }
    }
    Ok(())
}

/// Lists the selectable currencies with their flag countries.
pub fn run_currencies(flags_base_url: &str) -> Result<()> {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Country"),
        ui::header_cell("Flag"),
    ]);
    for (code, country) in SUPPORTED_CURRENCIES {
        table.add_row(vec![
            Cell::new(code),
            Cell::new(country),
            Cell::new(currency::flag_url(flags_base_url, code, 24).unwrap_or_default()),
        ]);
    }
    println!("{table}");
    Ok(())
}
