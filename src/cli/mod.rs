// src/cli/mod.rs - CLI definition (clap derive)

pub mod analyze;
pub mod progress;
pub mod services;
pub mod simulate;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "esgsim", about = "Multi-agent ESG market simulation", version)]
pub struct Cli {
    /// Config file path (default: $ESGSIM_HOME/config.toml or ~/.esgsim/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log at info level instead of warn
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the market for a number of rounds and print capital per firm
    Simulate {
        /// Rounds to run (overrides simulation.rounds)
        #[arg(short, long)]
        rounds: Option<u32>,
        /// Score firms one at a time
        #[arg(long)]
        sequential: bool,
        /// Skip network data sources
        #[arg(long)]
        offline: bool,
    },
    /// Score a single company and print commentary
    Analyze {
        /// Company name
        company: String,
        /// Stock ticker (e.g. 600519.SS, AAPL)
        #[arg(long)]
        ticker: Option<String>,
        /// City for air quality readings
        #[arg(long)]
        city: Option<String>,
        /// SEC Central Index Key
        #[arg(long)]
        cik: Option<String>,
        /// ISO country code for macro indicators
        #[arg(long)]
        country: Option<String>,
        /// Skip network data sources
        #[arg(long)]
        offline: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}
