pub mod cashback;
pub mod export;
pub mod init;
pub mod snapshot;
pub mod spending;
pub mod transfers;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::error::Result;
use crate::reports::{save_report, ReportTarget};
use crate::settings::Settings;

/// Today as `YYYY-MM-DD` in local time.
pub(crate) fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Where `--save` writes a report: `--output-dir` or `<data_dir>/report`.
pub(crate) fn report_target(
    settings: &Settings,
    name: &str,
    output_dir: Option<&Path>,
    file_name: Option<&str>,
) -> ReportTarget {
    let dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.reports_dir());
    ReportTarget::named(&dir, name).with_file_name(file_name)
}

/// Persist an already rendered JSON payload.
pub(crate) fn save_payload(json: &str, target: &ReportTarget) -> Result<PathBuf> {
    let value: Value = serde_json::from_str(json)?;
    save_report(&value, target)
}

#[derive(Parser)]
#[command(
    name = "spendlens",
    version,
    about = "Card spending, cashback and market snapshot for bank statement exports."
)]
pub struct Cli {
    /// Settings file (default: ~/.config/spendlens/user_settings.json)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that can write their result as a JSON report.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SaveArgs {
    /// Write the result to a JSON report file
    #[arg(long)]
    pub save: bool,
    /// Report directory (default: <data_dir>/report)
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// Report file name (default: report_<command>.json)
    #[arg(long = "file-name")]
    pub file_name: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a settings file with the currencies and stocks to track.
    Init {
        /// Currency codes, comma separated (e.g. USD,EUR)
        #[arg(long, value_delimiter = ',')]
        currencies: Vec<String>,
        /// Stock tickers, comma separated (e.g. AAPL,TSLA)
        #[arg(long, value_delimiter = ',')]
        stocks: Vec<String>,
        /// Path for reports and exports (default: ~/Documents/spendlens)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Month-to-date snapshot: cards, top transactions, rates and quotes.
    Snapshot {
        /// Path to the XLSX or CSV statement export
        file: PathBuf,
        /// Reference date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Skip network lookups; rates and prices are reported as null
        #[arg(long)]
        offline: bool,
        /// Print tables instead of JSON
        #[arg(long)]
        table: bool,
        /// HTTP timeout in seconds for market lookups
        #[arg(long, default_value = "10")]
        timeout: u64,
        /// Also write the filtered transactions to this XLSX or CSV file
        #[arg(long)]
        export: Option<PathBuf>,
        #[command(flatten)]
        save: SaveArgs,
    },
    /// Cashback per category for one month.
    Cashback {
        /// Path to the XLSX or CSV statement export
        file: PathBuf,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
        /// Only keep categories whose cashback is above this value
        #[arg(long)]
        threshold: Option<f64>,
        #[command(flatten)]
        save: SaveArgs,
    },
    /// List transfers to individuals.
    Transfers {
        /// Path to the XLSX or CSV statement export
        file: PathBuf,
        #[command(flatten)]
        save: SaveArgs,
    },
    /// Three-month spend in one category.
    Spending {
        /// Path to the XLSX or CSV statement export
        file: PathBuf,
        /// Category name, e.g. 'Супермаркеты'
        #[arg(long)]
        category: String,
        /// Reference date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        #[command(flatten)]
        save: SaveArgs,
    },
    /// Export the month-to-date transactions to XLSX or CSV.
    Export {
        /// Path to the XLSX or CSV statement export
        file: PathBuf,
        /// Output path; the extension picks the format
        #[arg(long)]
        output: PathBuf,
        /// Reference date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
}
