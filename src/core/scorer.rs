// src/core/scorer.rs - Dimension scorers
//
// One parameterized scorer per ESG dimension. Each scores every firm's
// disclosure independently and writes into its own ledger key.

use std::sync::Arc;

use futures::future::join_all;

use super::ledger::{DisclosureMap, ScoreLedger};
use super::types::{Dimension, ExecutionMode, FirmId, ScoreScale};
use crate::evaluator::ScoringService;

/// Declarative description of one scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionSpec {
    pub dimension: Dimension,
    /// Name passed to the scoring service.
    pub prompt_name: &'static str,
}

impl DimensionSpec {
    pub fn ledger_key(&self) -> &'static str {
        self.dimension.key()
    }
}

pub const DIMENSION_SPECS: [DimensionSpec; 3] = [
    DimensionSpec {
        dimension: Dimension::Environment,
        prompt_name: "environment",
    },
    DimensionSpec {
        dimension: Dimension::Social,
        prompt_name: "society",
    },
    DimensionSpec {
        dimension: Dimension::Governance,
        prompt_name: "governance",
    },
];

pub struct DimensionScorer {
    spec: DimensionSpec,
    service: Arc<dyn ScoringService>,
    scale: ScoreScale,
}

impl DimensionScorer {
    pub fn new(spec: DimensionSpec, service: Arc<dyn ScoringService>, scale: ScoreScale) -> Self {
        Self {
            spec,
            service,
            scale,
        }
    }

    /// One scorer per entry of [`DIMENSION_SPECS`], all sharing `service`.
    pub fn from_specs(service: Arc<dyn ScoringService>, scale: ScoreScale) -> Vec<Self> {
        DIMENSION_SPECS
            .iter()
            .map(|spec| Self::new(*spec, service.clone(), scale))
            .collect()
    }

    pub fn spec(&self) -> &DimensionSpec {
        &self.spec
    }

    pub fn dimension(&self) -> Dimension {
        self.spec.dimension
    }

    /// Score every disclosure and record the results. A failure for one
    /// firm never affects another. Returns how many scores fell back to
    /// the neutral midpoint.
    pub async fn step(
        &self,
        disclosures: &DisclosureMap,
        ledger: &ScoreLedger,
        mode: ExecutionMode,
    ) -> usize {
        let mut fallbacks = 0;
        match mode {
            ExecutionMode::Parallel => {
                let results = join_all(
                    disclosures
                        .iter()
                        .map(|(firm, d)| self.score_firm(firm, d.text(), ledger)),
                )
                .await;
                fallbacks += results.into_iter().filter(|ok| !ok).count();
            }
            ExecutionMode::Sequential => {
                for (firm, d) in disclosures {
                    if !self.score_firm(firm, d.text(), ledger).await {
                        fallbacks += 1;
                    }
                }
            }
        }
        fallbacks
    }

    /// Returns false when the neutral default was recorded.
    async fn score_firm(&self, firm: &FirmId, text: &str, ledger: &ScoreLedger) -> bool {
        let (score, usable) = match self.service.score(text, self.spec.prompt_name).await {
            Ok(value) if self.scale.contains(value) => (value, true),
            Ok(value) => {
                tracing::warn!(
                    firm = %firm,
                    dimension = self.spec.ledger_key(),
                    value,
                    "Score outside scale, using neutral default"
                );
                (self.scale.midpoint(), false)
            }
            Err(e) => {
                tracing::warn!(
                    firm = %firm,
                    dimension = self.spec.ledger_key(),
                    error = %e,
                    "Scoring failed, using neutral default"
                );
                (self.scale.midpoint(), false)
            }
        };
        tracing::debug!(firm = %firm, dimension = self.spec.ledger_key(), score, "Scored");
        ledger.record(firm, self.spec.dimension, score);
        usable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Disclosure;
    use crate::evaluator::MockScoringService;
    use crate::infra::errors::EsgError;

    fn disclosures(names: &[&str]) -> DisclosureMap {
        names
            .iter()
            .map(|n| (FirmId::new(*n), Disclosure::new(format!("{n} report"), vec![])))
            .collect()
    }

    #[test]
    fn test_specs_cover_every_dimension_once() {
        let dims: Vec<Dimension> = DIMENSION_SPECS.iter().map(|s| s.dimension).collect();
        assert_eq!(dims, Dimension::ALL.to_vec());
        let keys: Vec<&str> = DIMENSION_SPECS.iter().map(|s| s.ledger_key()).collect();
        assert_eq!(keys, ["env", "soc", "gov"]);
        assert_eq!(DIMENSION_SPECS[1].prompt_name, "society");
    }

    #[tokio::test]
    async fn test_step_records_scores() {
        let mut mock = MockScoringService::new();
        mock.expect_score()
            .withf(|_, dim| dim.contains("environment"))
            .times(2)
            .returning(|text, _| Ok(if text.starts_with('a') { 80.0 } else { 40.0 }));

        let scorer = DimensionScorer::new(DIMENSION_SPECS[0], Arc::new(mock), ScoreScale::default());
        let ledger = ScoreLedger::new();
        let fallbacks = scorer
            .step(&disclosures(&["a", "b"]), &ledger, ExecutionMode::Parallel)
            .await;

        assert_eq!(fallbacks, 0);
        assert_eq!(ledger.score(&FirmId::new("a"), Dimension::Environment), Some(80.0));
        assert_eq!(ledger.score(&FirmId::new("b"), Dimension::Environment), Some(40.0));
    }

    #[tokio::test]
    async fn test_failure_isolated_to_one_firm() {
        let mut mock = MockScoringService::new();
        mock.expect_score().returning(|text, _| {
            if text.starts_with("bad") {
                Err(EsgError::Provider {
                    provider: "mock".into(),
                    message: "down".into(),
                    retriable: false,
                })
            } else {
                Ok(70.0)
            }
        });

        let scorer = DimensionScorer::new(DIMENSION_SPECS[2], Arc::new(mock), ScoreScale::default());
        let ledger = ScoreLedger::new();
        let fallbacks = scorer
            .step(&disclosures(&["bad", "good"]), &ledger, ExecutionMode::Sequential)
            .await;

        assert_eq!(fallbacks, 1);
        assert_eq!(ledger.score(&FirmId::new("bad"), Dimension::Governance), Some(50.0));
        assert_eq!(ledger.score(&FirmId::new("good"), Dimension::Governance), Some(70.0));
    }

    #[tokio::test]
    async fn test_out_of_range_and_nan_become_neutral() {
        let mut mock = MockScoringService::new();
        mock.expect_score().returning(|text, _| {
            Ok(match text.chars().next() {
                Some('h') => 140.0,
                Some('n') => f64::NAN,
                _ => -1.0,
            })
        });

        let scorer = DimensionScorer::new(DIMENSION_SPECS[1], Arc::new(mock), ScoreScale::default());
        let ledger = ScoreLedger::new();
        let fallbacks = scorer
            .step(&disclosures(&["high", "nan", "low"]), &ledger, ExecutionMode::Parallel)
            .await;

        assert_eq!(fallbacks, 3);
        for firm in ["high", "nan", "low"] {
            assert_eq!(ledger.score(&FirmId::new(firm), Dimension::Social), Some(50.0));
        }
    }

    #[tokio::test]
    async fn test_parallel_scorers_share_ledger() {
        let mut mock = MockScoringService::new();
        mock.expect_score().returning(|_, dim| {
            Ok(match dim {
                "environment" => 10.0,
                "society" => 20.0,
                _ => 30.0,
            })
        });

        let scorers = DimensionScorer::from_specs(Arc::new(mock), ScoreScale::default());
        let ledger = ScoreLedger::new();
        let map = disclosures(&["a", "b", "c", "d"]);
        join_all(scorers.iter().map(|s| s.step(&map, &ledger, ExecutionMode::Parallel))).await;

        for firm in map.keys() {
            let scores = ledger.scores_for(firm);
            assert_eq!(scores.len(), 3);
            assert_eq!(scores[&Dimension::Environment], 10.0);
            assert_eq!(scores[&Dimension::Social], 20.0);
            assert_eq!(scores[&Dimension::Governance], 30.0);
        }
    }
}
