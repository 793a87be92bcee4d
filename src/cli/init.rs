use std::path::Path;

use crate::error::Result;
use crate::settings::{save_settings, settings_path, shellexpand_path, Settings};

pub fn run(
    settings_file: Option<&Path>,
    currencies: Vec<String>,
    stocks: Vec<String>,
    data_dir: Option<String>,
) -> Result<()> {
    let path = settings_file
        .map(Path::to_path_buf)
        .unwrap_or_else(settings_path);
    let mut settings = Settings {
        user_currencies: normalize(currencies),
        user_stocks: normalize(stocks),
        ..Settings::default()
    };
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    save_settings(&settings, &path)?;

    println!("Settings written to {}", path.display());
    println!("Data directory: {}", settings.data_dir().display());
    if !settings.has_market_symbols() {
        println!("Add currencies and stocks before running a snapshot.");
    }
    Ok(())
}

fn normalize(symbols: Vec<String>) -> Vec<String> {
    symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
