use std::path::Path;

use crate::cli::{report_target, SaveArgs};
use crate::error::Result;
use crate::fmt::pretty_json;
use crate::importer::load_table;
use crate::reports::{persist_report, spending_by_category};
use crate::settings::Settings;

pub fn run(
    settings: &Settings,
    file: &Path,
    category: &str,
    date: Option<&str>,
    save: &SaveArgs,
) -> Result<()> {
    let data = load_table(file)?;
    let report = if save.save {
        let target = report_target(
            settings,
            "spending_by_category",
            save.output_dir.as_deref(),
            save.file_name.as_deref(),
        );
        let report = persist_report(&target, || spending_by_category(&data, category, date))?;
        eprintln!("Report saved to {}", target.path().display());
        report
    } else {
        spending_by_category(&data, category, date)?
    };
    println!("{}", pretty_json(&report)?);
    Ok(())
}
