// src/core/orchestrator.rs - Round controller for the ESG market
//
// Owns the roster, the investors and the ledger. One call to `step()` runs
// a complete round: reset, disclosures, scoring, aggregation, investment.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;

use super::aggregator::CompositeAggregator;
use super::disclosure::DisclosureProvider;
use super::investor::{DecisionPolicy, Investor, ProportionalAllocator};
use super::ledger::ScoreLedger;
use super::rating::BandClassifier;
use super::scorer::DimensionScorer;
use super::strategy::StrategyChain;
use super::types::*;
use crate::evaluator::ScoringService;
use crate::infra::config::{Config, InvestorConfig, PolicyKind};
use crate::infra::errors::EsgError;
use crate::sources::DataSource;

/// Lifecycle notifications for drivers that want live progress.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    RoundStarted { round: u64, firms: usize },
    DisclosuresReady { round: u64, count: usize },
    ScoringComplete { round: u64, fallbacks: usize, backfilled: usize },
    AllocationsApplied { round: u64, allocations: usize, capital: f64 },
}

/// The ESG market model.
pub struct EsgModel {
    firms: Vec<Firm>,
    index: BTreeMap<FirmId, usize>,
    investors: Vec<Investor>,
    scorers: Vec<DimensionScorer>,
    disclosure_provider: DisclosureProvider,
    aggregator: CompositeAggregator,
    ledger: ScoreLedger,
    mode: ExecutionMode,
    round: u64,
    last_decisions: Vec<Allocation>,
    on_progress: Option<Box<dyn Fn(RoundEvent) + Send + Sync>>,
}

impl EsgModel {
    /// Fails on duplicate firm ids.
    pub fn new(
        profiles: Vec<FirmProfile>,
        investors: Vec<Investor>,
        scorers: Vec<DimensionScorer>,
        aggregator: CompositeAggregator,
    ) -> Result<Self, EsgError> {
        let mut index = BTreeMap::new();
        for (i, profile) in profiles.iter().enumerate() {
            if index.insert(profile.id.clone(), i).is_some() {
                return Err(EsgError::Config(format!(
                    "duplicate firm id '{}' in roster",
                    profile.id
                )));
            }
        }
        if profiles.is_empty() {
            tracing::warn!("Empty firm roster, rounds will be no-ops");
        }

        Ok(Self {
            firms: profiles.into_iter().map(Firm::new).collect(),
            index,
            investors,
            scorers,
            disclosure_provider: DisclosureProvider::offline(),
            aggregator,
            ledger: ScoreLedger::new(),
            mode: ExecutionMode::default(),
            round: 0,
            last_decisions: Vec::new(),
            on_progress: None,
        })
    }

    /// Build the full model from configuration. Disclosures stay offline
    /// until `with_sources` is called.
    pub fn from_config(config: &Config, service: Arc<dyn ScoringService>) -> Result<Self, EsgError> {
        config.validate()?;
        let scale = config.scale;

        let classifier = BandClassifier::new(config.rating.bands.clone(), config.rating.floor.clone());
        let aggregator = CompositeAggregator::new(
            config.aggregation.weights,
            scale,
            Arc::new(classifier),
            config.aggregation.return_normalization,
        )?;

        let profiles = if config.firms.is_empty() {
            (0..config.simulation.virtual_firms)
                .map(FirmProfile::virtual_firm)
                .collect()
        } else {
            config.firms.clone()
        };

        let investors = if config.investors.is_empty() {
            (0..config.simulation.investors)
                .map(|i| InvestorConfig::default().build(100 + i, config))
                .collect()
        } else {
            config
                .investors
                .iter()
                .enumerate()
                .map(|(i, inv)| inv.build(100 + i, config))
                .collect()
        };

        let mode = if config.simulation.parallel_scoring {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Sequential
        };

        Ok(Self::new(
            profiles,
            investors,
            DimensionScorer::from_specs(service, scale),
            aggregator,
        )?
        .with_mode(mode))
    }

    pub fn with_sources(mut self, sources: Vec<Arc<dyn DataSource>>) -> Self {
        self.disclosure_provider = DisclosureProvider::new(sources);
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set a callback for round lifecycle events.
    pub fn with_progress(mut self, cb: impl Fn(RoundEvent) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }

    fn emit(&self, event: RoundEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    /// Run one complete round. Returns the round number just completed.
    pub async fn step(&mut self) -> u64 {
        let round = self.round + 1;
        tracing::info!(round, firms = self.firms.len(), investors = self.investors.len(), "Round started");
        self.emit(RoundEvent::RoundStarted {
            round,
            firms: self.firms.len(),
        });

        // 1. Reset
        self.ledger.clear();
        self.last_decisions.clear();
        for firm in &mut self.firms {
            firm.reset_round();
        }

        // 2. Disclosures
        let provider = &self.disclosure_provider;
        let disclosures = match self.mode {
            ExecutionMode::Parallel => join_all(self.firms.iter().map(|f| provider.generate(f))).await,
            ExecutionMode::Sequential => {
                let mut out = Vec::with_capacity(self.firms.len());
                for firm in &self.firms {
                    out.push(provider.generate(firm).await);
                }
                out
            }
        };
        for (firm, disclosure) in self.firms.iter().zip(disclosures) {
            self.ledger.submit_disclosure(firm.id().clone(), disclosure);
        }
        self.emit(RoundEvent::DisclosuresReady {
            round,
            count: self.ledger.disclosures().len(),
        });

        // 3. Scoring
        let ledger = &self.ledger;
        let map = ledger.disclosures();
        let mode = self.mode;
        let fallbacks: usize = match mode {
            ExecutionMode::Parallel => join_all(self.scorers.iter().map(|s| s.step(map, ledger, mode)))
                .await
                .into_iter()
                .sum(),
            ExecutionMode::Sequential => {
                let mut total = 0;
                for scorer in &self.scorers {
                    total += scorer.step(map, ledger, mode).await;
                }
                total
            }
        };
        let backfilled = self.ledger.backfill(
            self.firms.iter().map(Firm::id),
            &Dimension::ALL,
            self.aggregator.scale().midpoint(),
        );
        if fallbacks > 0 || backfilled > 0 {
            tracing::warn!(round, fallbacks, backfilled, "Some scores defaulted to neutral");
        }
        self.emit(RoundEvent::ScoringComplete {
            round,
            fallbacks,
            backfilled,
        });

        // 4. Investment against one snapshot, applied afterwards
        let views = self.aggregator.aggregate_all(&self.firms, &self.ledger);
        let decisions: Vec<Allocation> = self
            .investors
            .iter()
            .flat_map(|inv| inv.decide(&views, self.ledger.disclosures()))
            .collect();

        let mut capital = 0.0;
        for decision in &decisions {
            if let Some(&i) = self.index.get(&decision.firm) {
                self.firms[i].receive(decision.amount);
                capital += decision.amount;
            }
        }
        self.last_decisions = decisions;
        self.round = round;

        tracing::info!(round, allocations = self.last_decisions.len(), capital, "Round complete");
        self.emit(RoundEvent::AllocationsApplied {
            round,
            allocations: self.last_decisions.len(),
            capital,
        });
        round
    }

    /// Aggregated views for the last completed round.
    pub fn get_firm_scores(&self) -> Result<BTreeMap<FirmId, AggregatedView>, EsgError> {
        if self.round == 0 {
            return Err(EsgError::NoRoundCompleted);
        }
        Ok(self.aggregator.aggregate_all(&self.firms, &self.ledger))
    }

    pub fn firms(&self) -> &[Firm] {
        &self.firms
    }

    pub fn firm(&self, id: &FirmId) -> Option<&Firm> {
        self.index.get(id).map(|&i| &self.firms[i])
    }

    pub fn investors(&self) -> &[Investor] {
        &self.investors
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Every allocation (including vetoes) from the last completed round.
    pub fn last_decisions(&self) -> &[Allocation] {
        &self.last_decisions
    }
}

impl InvestorConfig {
    fn build(&self, number: usize, config: &Config) -> Investor {
        let id = format!("investor-{number}");
        let name = self.name.clone().unwrap_or_else(|| format!("Investor {number}"));
        let policy = match self.policy {
            PolicyKind::StrategyChain => DecisionPolicy::StrategyChain(StrategyChain::from_config(&config.strategy)),
            PolicyKind::Proportional => DecisionPolicy::Proportional(ProportionalAllocator::new(
                config.proportional.pool,
                config.proportional.score_weight,
                config.scale,
            )),
        };
        Investor::new(id, name, policy)
    }
}
