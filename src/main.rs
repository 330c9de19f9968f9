// src/main.rs - esgsim entry point

use clap::Parser;

use esgsim::cli::{Cli, Commands};
use esgsim::core::types::FirmProfile;
use esgsim::infra::config::Config;
use esgsim::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG still overrides either level
    logger::init_logging(if cli.verbose { "info" } else { "warn" });

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    match cli.command {
        Commands::Simulate {
            rounds,
            sequential,
            offline,
        } => esgsim::cli::simulate::run_simulate(&config, rounds, sequential, offline).await,
        Commands::Analyze {
            company,
            ticker,
            city,
            cik,
            country,
            offline,
        } => {
            let mut profile = FirmProfile::new(ticker.clone().unwrap_or_else(|| company.clone()), company);
            profile.ticker = ticker;
            profile.city = city;
            profile.cik = cik;
            profile.country = country;
            esgsim::cli::analyze::run_analyze(&config, profile, offline).await
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
