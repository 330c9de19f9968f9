// src/cli/simulate.rs - Multi-round simulation driver

use std::collections::BTreeMap;
use std::fmt::Write;

use super::progress::terminal_progress;
use super::services;
use crate::core::orchestrator::EsgModel;
use crate::core::types::{AggregatedView, ExecutionMode, Firm, FirmId};
use crate::infra::config::Config;
use crate::sources::default_sources;

pub async fn run_simulate(
    config: &Config,
    rounds: Option<u32>,
    sequential: bool,
    offline: bool,
) -> anyhow::Result<()> {
    let provider = services::model_provider(&config.model);
    let scorer = services::scoring_service(provider, &config.model, config.scale);

    let mut model = EsgModel::from_config(config, scorer)?.with_progress(terminal_progress());
    if sequential {
        model = model.with_mode(ExecutionMode::Sequential);
    }
    if !offline {
        model = model.with_sources(default_sources(&config.sources));
    }

    let rounds = rounds.unwrap_or(config.simulation.rounds);
    for _ in 0..rounds {
        let round = model.step().await;
        let views = model.get_firm_scores()?;
        print!("{}", round_table(round, model.firms(), &views));
    }
    Ok(())
}

/// One line per firm: scores, rating and capital.
pub fn round_table(round: u64, firms: &[Firm], views: &BTreeMap<FirmId, AggregatedView>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nRound {round}");
    let _ = writeln!(
        out,
        "  {:<20} {:>6} {:>6} {:>6} {:>9} {:>6} {:>10} {:>10}",
        "firm", "env", "soc", "gov", "composite", "rating", "round", "total"
    );
    for firm in firms {
        let Some(view) = views.get(firm.id()) else {
            continue;
        };
        let _ = writeln!(
            out,
            "  {:<20} {:>6.1} {:>6.1} {:>6.1} {:>9.2} {:>6} {:>10.1} {:>10.1}",
            truncate(firm.name(), 20),
            view.environment,
            view.social,
            view.governance,
            view.composite,
            view.rating,
            firm.capital_this_round(),
            firm.capital_total(),
        );
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}~")
    }
}
