// src/cli/analyze.rs - Single-company ESG analysis with commentary

use std::fmt::Write;

use super::services;
use crate::core::orchestrator::EsgModel;
use crate::core::types::{AggregatedView, Dimension, FirmProfile};
use crate::evaluator::commentary::{commentary_or_fallback, FALLBACK_COMMENTARY};
use crate::evaluator::parser::{parse_commentary, Commentary};
use crate::infra::config::Config;
use crate::sources::default_sources;

pub async fn run_analyze(config: &Config, profile: FirmProfile, offline: bool) -> anyhow::Result<()> {
    let provider = services::model_provider(&config.model);
    let scorer = services::scoring_service(provider.clone(), &config.model, config.scale);

    let mut single = config.clone();
    single.firms = vec![profile.clone()];
    single.investors.clear();
    single.simulation.investors = 0;

    let mut model = EsgModel::from_config(&single, scorer)?;
    if !offline {
        model = model.with_sources(default_sources(&config.sources));
    }
    model.step().await;

    let views = model.get_firm_scores()?;
    let view = views
        .get(&profile.id)
        .ok_or_else(|| anyhow::anyhow!("no scores for '{}'", profile.name))?;
    let disclosure = model
        .ledger()
        .disclosure(&profile.id)
        .map(|d| d.text().to_string())
        .unwrap_or_default();

    let summary = score_summary(view);
    let commentary = match provider {
        Some(p) => {
            let commentator = services::commentator(p, &config.model);
            commentary_or_fallback(&commentator, &disclosure, &summary).await
        }
        None => FALLBACK_COMMENTARY.to_string(),
    };

    print!(
        "{}",
        render_report(&profile.name, &disclosure, view, &parse_commentary(&commentary))
    );
    Ok(())
}

fn score_summary(view: &AggregatedView) -> String {
    let mut out = String::new();
    for d in Dimension::ALL {
        let _ = writeln!(out, "{}: {:.1}", d.label(), view.score(d));
    }
    let _ = write!(out, "Composite: {:.2} ({})", view.composite, view.rating);
    out
}

pub fn render_report(
    name: &str,
    disclosure: &str,
    view: &AggregatedView,
    commentary: &Commentary,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{name}\n");
    let _ = writeln!(out, "Disclosure:");
    for line in disclosure.lines() {
        let _ = writeln!(out, "  {line}");
    }
    let _ = writeln!(out);
    for d in Dimension::ALL {
        let _ = writeln!(out, "  {:<12} {:>6.1}", d.label(), view.score(d));
    }
    let _ = writeln!(out, "  {:<12} {:>6.2}", "Composite", view.composite);
    let _ = writeln!(out, "  {:<12} {:>6}", "Rating", view.rating);
    let _ = writeln!(out, "\nESG assessment:\n{}", commentary.assessment);
    if !commentary.advice.is_empty() {
        let _ = writeln!(out, "\nInvestment advice:\n{}", commentary.advice);
    }
    out
}
