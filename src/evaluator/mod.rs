// src/evaluator/mod.rs - Scoring and commentary collaborators
//
// The simulation core only sees the two traits below. Concrete back ends
// (LLM judge, fixed values) live in the submodules.

pub mod commentary;
pub mod judge;
pub mod parser;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::types::ScoreScale;
use crate::infra::errors::EsgError;

/// Rates one disclosure along one named dimension.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoringService: Send + Sync {
    async fn score(&self, disclosure: &str, dimension: &str) -> Result<f64, EsgError>;
}

/// Produces free-text commentary for a driver (CLI/UI). Not used by the core.
#[async_trait]
pub trait CommentaryService: Send + Sync {
    async fn commentary(&self, disclosure: &str, score_summary: &str) -> Result<String, EsgError>;
}

/// Returns a configured value per dimension name, or a default.
#[derive(Debug, Clone)]
pub struct FixedScorer {
    values: HashMap<String, f64>,
    default: f64,
}

impl FixedScorer {
    pub fn new(default: f64) -> Self {
        Self {
            values: HashMap::new(),
            default,
        }
    }

    /// Every dimension scores the scale midpoint.
    pub fn neutral(scale: &ScoreScale) -> Self {
        Self::new(scale.midpoint())
    }

    pub fn with(mut self, dimension: impl Into<String>, value: f64) -> Self {
        self.values.insert(dimension.into(), value);
        self
    }
}

#[async_trait]
impl ScoringService for FixedScorer {
    async fn score(&self, _disclosure: &str, dimension: &str) -> Result<f64, EsgError> {
        Ok(self.values.get(dimension).copied().unwrap_or(self.default))
    }
}
