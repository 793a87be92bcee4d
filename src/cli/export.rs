use std::path::Path;

use crate::cli::today;
use crate::error::Result;
use crate::export::export_table;
use crate::importer::load_table;
use crate::window::filter_by_date;

pub fn run(file: &Path, output: &Path, date: Option<String>) -> Result<()> {
    let data = load_table(file)?;
    let date = date.unwrap_or_else(today);
    let filtered = filter_by_date(&data, &date)?;
    if filtered.is_empty() {
        tracing::warn!(%date, "no transactions between the first of the month and the reference date");
    }
    export_table(&filtered, output)?;
    println!("Exported {} transactions to {}", filtered.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_with_empty_window_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("operations.csv");
        std::fs::write(
            &source,
            "Дата операции,Сумма операции\n25.10.2023 12:00:00,-100\n",
        )
        .unwrap();
        let out = dir.path().join("filtered.csv");
        run(&source, &out, Some("2023-10-15".into())).unwrap();
        let content = std::fs::read_to_string(&out).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), vec!["Дата операции,Сумма операции"]);
    }
}
