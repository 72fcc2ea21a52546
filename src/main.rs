mod budget;
mod categorizer;
mod cli;
mod error;
mod fmt;
mod forecast;
mod importer;
mod models;
mod reports;
mod settings;
mod store;

use clap::Parser;
use tracing_subscriber::{fmt as log_fmt, prelude::*, EnvFilter};

use cli::{CategoriesCommands, Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins, then --verbose, then warnings only.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("spendsight=debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            log_fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match cli.command {
        Commands::Init {
            data_dir,
            store,
            currency,
        } => cli::init::run(data_dir, store, currency),
        Commands::Status => cli::status::run(),
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Add { name } => cli::categories::add(&name),
            CategoriesCommands::Learn { category, keyword } => {
                cli::categories::learn(&category, &keyword)
            }
        },
        Commands::Expenses { file } => cli::report::expenses(&file),
        Commands::Payments { file } => cli::report::payments(&file),
        Commands::Budget { file } => cli::report::budget(&file),
        Commands::Forecast { file } => cli::report::forecast(&file),
        Commands::Recategorize { file, overrides } => cli::recategorize::run(&file, &overrides),
        Commands::Export { file, out_dir } => cli::export::run(&file, out_dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
