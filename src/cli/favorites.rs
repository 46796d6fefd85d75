use super::ui;
use crate::core::favorites::{Favorites, add_favorite, remove_favorite};
use crate::core::{LocalStorage, Pair};
use anyhow::Result;
use comfy_table::Cell;

#[derive(Debug, Clone)]
pub enum FavoriteAction {
    List,
    Add(Pair),
    Remove(Pair),
}

/// Numbered favorites table; `current` is highlighted.
pub fn render_favorites(favorites: &Favorites, current: Option<&Pair>) -> Option<String> {
    if favorites.is_empty() {
        return None;
    }
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("#"), ui::header_cell("Pair")]);
    for (i, pair) in favorites.iter().enumerate() {
        let label = format!("{} → {}", pair.from, pair.to);
        let cell = if current == Some(pair) {
            ui::value_cell(label)
        } else {
            Cell::new(label)
        };
        table.add_row(vec![Cell::new(i + 1), cell]);
    }
    Some(table.to_string())
}

pub fn run(storage: &dyn LocalStorage, action: FavoriteAction) -> Result<()> {
    match action {
        FavoriteAction::List => {
            let favorites = Favorites::load(storage)?;
            match render_favorites(&favorites, None) {
                Some(table) => println!("{table}"),
                None => println!("No favorite pairs yet. Add one with `fxc favorites add FROM TO`."),
            }
        }
        FavoriteAction::Add(pair) => {
            if add_favorite(storage, pair.clone())? {
                println!("★ Added {pair} to favorites");
            } else {
                println!("✓ {pair} is already a favorite");
            }
        }
        FavoriteAction::Remove(pair) => {
            if remove_favorite(storage, &pair)? {
                println!("Removed {pair} from favorites");
            } else {
                println!("{pair} is not a favorite");
            }
        }
    }
    Ok(())
}
