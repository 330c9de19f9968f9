// src/core/investor.rs - Investor agents and their decision policies

use std::collections::BTreeMap;

use super::ledger::DisclosureMap;
use super::strategy::{Decision, StrategyChain};
use super::types::{AggregatedView, Allocation, FirmId, ScoreScale, StrategyKind};

pub const DEFAULT_POOL: f64 = 1000.0;
pub const DEFAULT_SCORE_WEIGHT: f64 = 0.7;

/// Distributes a fixed pool across the roster in proportion to a blend of
/// normalized composite score and return proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct ProportionalAllocator {
    pool: f64,
    score_weight: f64,
    scale: ScoreScale,
}

impl ProportionalAllocator {
    pub fn new(pool: f64, score_weight: f64, scale: ScoreScale) -> Self {
        Self {
            pool,
            score_weight: score_weight.clamp(0.0, 1.0),
            scale,
        }
    }

    pub fn pool(&self) -> f64 {
        self.pool
    }

    /// Non-finite and negative weights count as zero.
    pub fn weight(&self, view: &AggregatedView) -> f64 {
        let w = self.score_weight * self.scale.normalize(view.composite)
            + (1.0 - self.score_weight) * view.return_proxy;
        if w.is_finite() && w > 0.0 {
            w
        } else {
            0.0
        }
    }

    /// Empty when the total weight is zero.
    pub fn allocate(&self, views: &BTreeMap<FirmId, AggregatedView>) -> Vec<(FirmId, f64)> {
        let weights: Vec<(&FirmId, f64)> = views.iter().map(|(id, v)| (id, self.weight(v))).collect();
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 || !self.pool.is_finite() || self.pool <= 0.0 {
            tracing::warn!(total_weight = total, pool = self.pool, "Nothing to allocate this round");
            return Vec::new();
        }
        weights
            .into_iter()
            .map(|(id, w)| (id.clone(), self.pool * w / total))
            .collect()
    }
}

impl Default for ProportionalAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_POOL, DEFAULT_SCORE_WEIGHT, ScoreScale::default())
    }
}

/// Fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionPolicy {
    StrategyChain(StrategyChain),
    Proportional(ProportionalAllocator),
}

impl DecisionPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            DecisionPolicy::StrategyChain(_) => "strategy_chain",
            DecisionPolicy::Proportional(_) => "proportional",
        }
    }
}

/// Stateless across rounds.
#[derive(Debug, Clone)]
pub struct Investor {
    id: String,
    name: String,
    policy: DecisionPolicy,
}

impl Investor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, policy: DecisionPolicy) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            policy,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Decide against one snapshot. Vetoes are reported as zero-amount
    /// allocations; firms no strategy picked are omitted.
    pub fn decide(
        &self,
        views: &BTreeMap<FirmId, AggregatedView>,
        disclosures: &DisclosureMap,
    ) -> Vec<Allocation> {
        match &self.policy {
            DecisionPolicy::StrategyChain(chain) => views
                .iter()
                .filter_map(|(firm, view)| {
                    let text = disclosures.get(firm).map(|d| d.text()).unwrap_or_default();
                    let Decision { strategy, amount } = chain.evaluate(view, text)?;
                    tracing::info!(
                        investor = %self.id,
                        firm = %firm,
                        strategy = %strategy,
                        amount,
                        composite = view.composite,
                        "Investment decision"
                    );
                    Some(self.allocation(firm, strategy, amount))
                })
                .collect(),
            DecisionPolicy::Proportional(allocator) => allocator
                .allocate(views)
                .into_iter()
                .map(|(firm, amount)| {
                    tracing::info!(
                        investor = %self.id,
                        firm = %firm,
                        strategy = %StrategyKind::Proportional,
                        amount,
                        "Investment decision"
                    );
                    self.allocation(&firm, StrategyKind::Proportional, amount)
                })
                .collect(),
        }
    }

    fn allocation(&self, firm: &FirmId, strategy: StrategyKind, amount: f64) -> Allocation {
        Allocation {
            investor: self.id.clone(),
            firm: firm.clone(),
            strategy,
            amount,
        }
    }
}
