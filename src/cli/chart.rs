use super::ui;
use crate::core::series::{self, HistoricalRateProvider, RatePoint, SeriesStats};
use crate::core::Pair;
use anyhow::Result;
use chrono::Local;
use tracing::error;

pub const CHART_HEIGHT: usize = 10;
pub const HISTORY_ERROR_MESSAGE: &str = "Could not load historical data. Please try again later.";

const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Renders one column per point as a filled area, `height` rows tall, with
/// the max/min labels on the y axis and the first/last dates underneath.
pub fn render_area_chart(points: &[RatePoint], height: usize) -> Vec<String> {
    let Some(stats) = SeriesStats::from_points(points) else {
        return Vec::new();
    };
    let height = height.max(1);
    let steps = height * 8;
    let span = stats.max - stats.min;

    let levels: Vec<usize> = points
        .iter()
        .map(|p| {
            if span > 0.0 {
                ((p.rate - stats.min) / span * (steps - 1) as f64).round() as usize + 1
            } else {
                steps / 2
            }
        })
        .collect();

    let max_label = format!("{:.4}", stats.max);
    let min_label = format!("{:.4}", stats.min);
    let label_width = max_label.len().max(min_label.len());

    let mut lines = Vec::with_capacity(height + 2);
    for row in 0..height {
        let row_floor = (height - 1 - row) * 8;
        let label = if row == 0 {
            max_label.as_str()
        } else if row == height - 1 {
            min_label.as_str()
        } else {
            ""
        };
        let cells: String = levels
            .iter()
            .map(|&level| {
                if level >= row_floor + 8 {
                    '█'
                } else if level > row_floor {
                    BLOCKS[level - row_floor - 1]
                } else {
                    ' '
                }
            })
            .collect();
        lines.push(format!("{label:>label_width$} │{cells}"));
    }

    lines.push(format!(
        "{:>label_width$} └{}",
        "",
        "─".repeat(points.len())
    ));

    let first = points[0].date.format("%b %d").to_string();
    let last = points[points.len() - 1].date.format("%b %d").to_string();
    let axis_width = points.len().max(first.len() + last.len() + 1);
    let gap = axis_width - first.len() - last.len();
    lines.push(format!(
        "{:>label_width$}  {first}{}{last}",
        "",
        " ".repeat(gap)
    ));
    lines
}

/// Chart plus the min/avg/max summary for a pair.
pub fn render_history(pair: &Pair, points: &[RatePoint], days: u32) -> String {
    let Some(stats) = SeriesStats::from_points(points) else {
        return ui::style_text(
            &format!("No historical data available for {pair}"),
            ui::StyleType::Subtle,
        );
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Min"),
        ui::header_cell("Average"),
        ui::header_cell("Max"),
    ]);
    table.add_row(vec![
        ui::number_cell(format!("{:.4}", stats.min)),
        ui::number_cell(format!("{:.4}", stats.avg)),
        ui::number_cell(format!("{:.4}", stats.max)),
    ]);

    let mut output = format!(
        "Exchange Rate History: {}\n\n",
        ui::style_text(&pair.to_string(), ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str("\n\n");
    output.push_str(&render_area_chart(points, CHART_HEIGHT).join("\n"));
    output.push_str(&format!(
        "\n\n{}",
        ui::style_text(
            &format!(
                "Fluctuations of {} to {} over the past {days} days",
                pair.from, pair.to
            ),
            ui::StyleType::Subtle
        )
    ));
    output
}

/// Fetches the trailing series ending today. Failures are logged and
/// reported with the generic message.
pub async fn fetch_history(
    provider: &dyn HistoricalRateProvider,
    pair: &Pair,
    days: u32,
) -> std::result::Result<Vec<RatePoint>, &'static str> {
    let (start, end) = series::date_window(Local::now().date_naive(), days);
    provider
        .fetch_series(&pair.from, &pair.to, start, end)
        .await
        .map_err(|e| {
            error!(error = %e, %pair, "Error fetching history");
            HISTORY_ERROR_MESSAGE
        })
}

pub async fn run(provider: &dyn HistoricalRateProvider, pair: &Pair, days: u32) -> Result<()> {
    let pb = ui::new_spinner("Fetching historical rates...");
    let result = fetch_history(provider, pair, days).await;
    pb.finish_and_clear();

    match result {
        Ok(points) => println!("{}", render_history(pair, &points, days)),
        Err(message) => println!("{}", ui::style_text(message, ui::StyleType::Error)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn points(rates: &[f64]) -> Vec<RatePoint> {
        rates
            .iter()
            .enumerate()
            .map(|(i, rate)| RatePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, i as u32 + 1).unwrap(),
                rate: *rate,
            })
            .collect()
    }

    fn cells(line: &str) -> Vec<char> {
        line.split('│').nth(1).unwrap().chars().collect()
    }

    #[test]
    fn test_area_chart_shape() {
        let lines = render_area_chart(&points(&[1.0, 1.5, 2.0]), 4);
        // rows + axis + date labels
        assert_eq!(lines.len(), 6);

        assert!(lines[0].starts_with("2.0000 │"));
        assert!(lines[3].starts_with("1.0000 │"));
        assert_eq!(cells(&lines[0]), vec![' ', ' ', '█']);
        assert_eq!(cells(&lines[3]), vec!['▁', '█', '█']);

        assert!(lines[5].contains("Jan 01"));
        assert!(lines[5].ends_with("Jan 03"));
    }

    #[test]
    fn test_flat_series_renders_half_height() {
        let lines = render_area_chart(&points(&[1.2, 1.2]), 2);
        assert_eq!(cells(&lines[0]), vec![' ', ' ']);
        assert_eq!(cells(&lines[1]), vec!['█', '█']);
    }

    #[test]
    fn test_empty_series() {
        assert!(render_area_chart(&[], 4).is_empty());
        let pair = Pair::new("USD", "INR").unwrap();
        assert!(render_history(&pair, &[], 30).contains("No historical data available for USD/INR"));
    }

    #[test]
    fn test_history_summary() {
        let pair = Pair::new("USD", "INR").unwrap();
        let output = render_history(&pair, &points(&[83.0, 84.0, 85.0]), 30);
        assert!(output.contains("83.0000"));
        assert!(output.contains("84.0000"));
        assert!(output.contains("85.0000"));
        assert!(output.contains("over the past 30 days"));
    }
}
