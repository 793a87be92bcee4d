use std::path::Path;

use crate::cli::{report_target, save_payload, SaveArgs};
use crate::error::Result;
use crate::importer::load_table;
use crate::services::analyze_cashback_categories;
use crate::settings::Settings;

pub fn run(
    settings: &Settings,
    file: &Path,
    year: i32,
    month: u32,
    threshold: Option<f64>,
    save: &SaveArgs,
) -> Result<()> {
    let data = load_table(file)?;
    let json = analyze_cashback_categories(&data, year, month, threshold);
    if save.save {
        let target = report_target(settings, "cashback", save.output_dir.as_deref(), save.file_name.as_deref());
        let path = save_payload(&json, &target)?;
        eprintln!("Report saved to {}", path.display());
    }
    println!("{json}");
    Ok(())
}
