// src/core/aggregator.rs - Composite score, rating and return proxy

use std::collections::BTreeMap;
use std::sync::Arc;

use super::ledger::ScoreLedger;
use super::rating::RatingClassifier;
use super::types::{AggregatedView, Dimension, DimensionWeights, Firm, FirmId, ScoreScale};
use crate::infra::errors::EsgError;

pub const DEFAULT_RETURN_NORMALIZATION: f64 = 1000.0;

/// Derives read-only views from the ledger. Never stores anything.
pub struct CompositeAggregator {
    weights: DimensionWeights,
    scale: ScoreScale,
    classifier: Arc<dyn RatingClassifier>,
    return_normalization: f64,
}

impl CompositeAggregator {
    /// Fails when the weights are not a convex combination, the scale is
    /// empty, or the normalization is not a positive number.
    pub fn new(
        weights: DimensionWeights,
        scale: ScoreScale,
        classifier: Arc<dyn RatingClassifier>,
        return_normalization: f64,
    ) -> Result<Self, EsgError> {
        if !weights.is_convex() {
            return Err(EsgError::Config(format!(
                "composite weights must be non-negative and sum to 1.0, got {:.6}",
                weights.total()
            )));
        }
        if !scale.is_valid() {
            return Err(EsgError::Config(format!(
                "score scale [{}, {}] is empty",
                scale.min, scale.max
            )));
        }
        if !(return_normalization.is_finite() && return_normalization > 0.0) {
            return Err(EsgError::Config(format!(
                "return normalization must be positive, got {return_normalization}"
            )));
        }
        Ok(Self {
            weights,
            scale,
            classifier,
            return_normalization,
        })
    }

    pub fn weights(&self) -> &DimensionWeights {
        &self.weights
    }

    pub fn scale(&self) -> &ScoreScale {
        &self.scale
    }

    pub fn aggregate(&self, firm: &Firm, ledger: &ScoreLedger) -> AggregatedView {
        let scores = ledger.scores_for(firm.id());
        let neutral = self.scale.midpoint();
        let read = |d| scores.get(&d).copied().unwrap_or(neutral);
        let composite = self.weights.blend(&scores, neutral);

        AggregatedView {
            firm: firm.id().clone(),
            environment: read(Dimension::Environment),
            social: read(Dimension::Social),
            governance: read(Dimension::Governance),
            composite,
            rating: self.classifier.classify(composite),
            return_proxy: 1.0 + firm.capital_this_round() / self.return_normalization,
        }
    }

    pub fn aggregate_all<'a>(
        &self,
        firms: impl IntoIterator<Item = &'a Firm>,
        ledger: &ScoreLedger,
    ) -> BTreeMap<FirmId, AggregatedView> {
        firms
            .into_iter()
            .map(|f| (f.id().clone(), self.aggregate(f, ledger)))
            .collect()
    }
}
