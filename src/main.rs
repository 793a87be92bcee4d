mod cards;
mod cli;
mod error;
mod export;
mod fmt;
mod importer;
mod market;
mod models;
mod ranking;
mod reports;
mod services;
mod settings;
mod table;
mod views;
mod window;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::snapshot::SnapshotOptions;
use cli::{Cli, Commands};
use settings::load_settings;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let settings_file = cli.settings.as_deref();

    let result = match cli.command {
        Commands::Init {
            currencies,
            stocks,
            data_dir,
        } => cli::init::run(settings_file, currencies, stocks, data_dir),
        Commands::Snapshot {
            file,
            date,
            offline,
            table,
            timeout,
            export,
            save,
        } => cli::snapshot::run(
            &load_settings(settings_file),
            SnapshotOptions {
                file,
                date,
                offline,
                table,
                timeout,
                export,
                save,
            },
        ),
        Commands::Cashback {
            file,
            year,
            month,
            threshold,
            save,
        } => cli::cashback::run(&load_settings(settings_file), &file, year, month, threshold, &save),
        Commands::Transfers { file, save } => {
            cli::transfers::run(&load_settings(settings_file), &file, &save)
        }
        Commands::Spending {
            file,
            category,
            date,
            save,
        } => cli::spending::run(
            &load_settings(settings_file),
            &file,
            &category,
            date.as_deref(),
            &save,
        ),
        Commands::Export { file, output, date } => cli::export::run(&file, &output, date),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
