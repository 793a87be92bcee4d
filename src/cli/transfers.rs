use std::path::Path;

use crate::cli::{report_target, save_payload, SaveArgs};
use crate::error::Result;
use crate::services::find_transfers_to_individuals;
use crate::settings::Settings;

pub fn run(settings: &Settings, file: &Path, save: &SaveArgs) -> Result<()> {
    let json = find_transfers_to_individuals(file);
    if save.save {
        let target = report_target(settings, "transfers", save.output_dir.as_deref(), save.file_name.as_deref());
        let path = save_payload(&json, &target)?;
        eprintln!("Report saved to {}", path.display());
    }
    println!("{json}");
    Ok(())
}
