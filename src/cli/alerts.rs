use super::ui;
use crate::core::alerts::{AlertBook, AlertDirection, RateAlert};
use crate::core::{LocalStorage, Pair};
use anyhow::{Result, bail};
use chrono::Utc;
use comfy_table::Cell;

#[derive(Debug, Clone)]
pub enum AlertAction {
    List(Option<Pair>),
    Add {
        pair: Pair,
        direction: AlertDirection,
        target_rate: f64,
    },
    Remove(u64),
}

pub fn alert_notice(alert: &RateAlert, rate: f64) -> String {
    format!("Alert: {}. Current rate: {rate}", alert.describe())
}

/// Prints a notice for every stored alert that `rate` triggers on `pair`.
pub fn print_triggered(storage: &dyn LocalStorage, pair: &Pair, rate: f64) -> Result<usize> {
    let book = AlertBook::load(storage)?;
    let mut count = 0;
    for alert in book.triggered(pair, rate) {
        println!(
            "{}",
            ui::style_text(&format!("🔔 {}", alert_notice(alert, rate)), ui::StyleType::Warning)
        );
        count += 1;
    }
    Ok(count)
}

pub fn render_alerts<'a>(alerts: impl Iterator<Item = &'a RateAlert>) -> Option<String> {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Pair"),
        ui::header_cell("Condition"),
        ui::header_cell("Created"),
    ]);
    let mut rows = 0;
    for alert in alerts {
        table.add_row(vec![
            Cell::new(alert.id),
            Cell::new(format!("{}/{}", alert.from, alert.to)),
            Cell::new(format!("{} {}", alert.direction, alert.target_rate)),
            Cell::new(alert.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
        rows += 1;
    }
    (rows > 0).then(|| table.to_string())
}

pub fn run(storage: &dyn LocalStorage, action: AlertAction) -> Result<()> {
    let mut book = AlertBook::load(storage)?;
    match action {
        AlertAction::List(pair) => {
            let rendered = match &pair {
                Some(pair) => render_alerts(book.for_pair(pair)),
                None => render_alerts(book.iter()),
            };
            match (rendered, pair) {
                (Some(table), _) => println!("{table}"),
                (None, Some(_)) => println!("No alerts set for this pair."),
                (None, None) => println!("No alerts set."),
            }
        }
        AlertAction::Add {
            pair,
            direction,
            target_rate,
        } => {
            let alert = book.add(&pair, target_rate, direction, Utc::now())?.clone();
            book.save(storage)?;
            println!(
                "Alert {} set: when {}",
                alert.id,
                ui::style_text(&alert.describe(), ui::StyleType::TotalLabel)
            );
        }
        AlertAction::Remove(id) => {
            if !book.remove(id) {
                bail!("No alert with id {id}");
            }
            book.save(storage)?;
            println!("Removed alert {id}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStorage;

    #[test]
    fn test_add_list_remove() {
        let storage = MemoryStorage::new();
        let pair = Pair::new("USD", "INR").unwrap();

        run(
            &storage,
            AlertAction::Add {
                pair: pair.clone(),
                direction: AlertDirection::Above,
                target_rate: 80.0,
            },
        )
        .unwrap();
        let book = AlertBook::load(&storage).unwrap();
        assert_eq!(book.len(), 1);
        let id = book.iter().next().unwrap().id;

        assert_eq!(print_triggered(&storage, &pair, 83.0).unwrap(), 1);
        assert_eq!(print_triggered(&storage, &pair, 79.0).unwrap(), 0);
        assert_eq!(print_triggered(&storage, &pair.swapped(), 83.0).unwrap(), 0);

        run(&storage, AlertAction::List(Some(pair))).unwrap();
        run(&storage, AlertAction::Remove(id)).unwrap();
        assert!(AlertBook::load(&storage).unwrap().is_empty());
        assert!(run(&storage, AlertAction::Remove(id)).is_err());
    }

    #[test]
    fn test_add_rejects_non_positive_target() {
        let storage = MemoryStorage::new();
        let result = run(
            &storage,
            AlertAction::Add {
                pair: Pair::new("USD", "EUR").unwrap(),
                direction: AlertDirection::Below,
                target_rate: 0.0,
            },
        );
        assert!(result.is_err());
        assert!(storage.get_item("currencyAlerts").unwrap().is_none());
    }

    #[test]
    fn test_alert_notice() {
        let mut book = AlertBook::default();
        let pair = Pair::new("USD", "INR").unwrap();
        let alert = book
            .add(&pair, 83.0, AlertDirection::Above, Utc::now())
            .unwrap();
        assert_eq!(
            alert_notice(alert, 83.5),
            "Alert: USD/INR rate is above 83. Current rate: 83.5"
        );
    }

    #[test]
    fn test_render_alerts_empty() {
        assert!(render_alerts(std::iter::empty()).is_none());
    }
}
