// src/core/rating.rs - Composite score to rating label

use serde::{Deserialize, Serialize};

use super::types::Rating;

/// Pure, total and monotonic mapping from a composite score to a label.
pub trait RatingClassifier: Send + Sync {
    fn classify(&self, composite: f64) -> Rating;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBand {
    pub min_score: f64,
    pub label: String,
}

impl RatingBand {
    pub fn new(min_score: f64, label: impl Into<String>) -> Self {
        Self {
            min_score,
            label: label.into(),
        }
    }
}

/// Default bands on the 0-100 scale.
pub fn default_bands() -> Vec<RatingBand> {
    vec![
        RatingBand::new(85.0, "AAA"),
        RatingBand::new(75.0, "AA"),
        RatingBand::new(65.0, "A"),
        RatingBand::new(55.0, "BBB"),
        RatingBand::new(45.0, "BB"),
        RatingBand::new(35.0, "B"),
    ]
}

pub const DEFAULT_FLOOR: &str = "CCC";

/// Highest band whose lower bound the score reaches; otherwise the floor.
#[derive(Debug, Clone)]
pub struct BandClassifier {
    bands: Vec<RatingBand>,
    floor: String,
}

impl BandClassifier {
    pub fn new(mut bands: Vec<RatingBand>, floor: impl Into<String>) -> Self {
        bands.retain(|b| b.min_score.is_finite());
        bands.sort_by(|a, b| b.min_score.total_cmp(&a.min_score));
        Self {
            bands,
            floor: floor.into(),
        }
    }

    pub fn bands(&self) -> &[RatingBand] {
        &self.bands
    }
}

impl Default for BandClassifier {
    fn default() -> Self {
        Self::new(default_bands(), DEFAULT_FLOOR)
    }
}

impl RatingClassifier for BandClassifier {
    fn classify(&self, composite: f64) -> Rating {
        let label = self
            .bands
            .iter()
            .find(|b| composite >= b.min_score)
            .map(|b| b.label.as_str())
            .unwrap_or(&self.floor);
        Rating::new(label)
    }
}
