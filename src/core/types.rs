// src/core/types.rs - Core domain types

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

/// Opaque firm identity. Ordered so per-round maps iterate deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FirmId(pub String);

impl FirmId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FirmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// One independent scoring axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Environment,
    Social,
    Governance,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::Environment,
        Dimension::Social,
        Dimension::Governance,
    ];

    /// Short ledger key.
    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Environment => "env",
            Dimension::Social => "soc",
            Dimension::Governance => "gov",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Environment => "Environment",
            Dimension::Social => "Social",
            Dimension::Governance => "Governance",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub type DimensionScores = BTreeMap<Dimension, f64>;

/// Valid score range for one run. Every score in the ledger lies inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreScale {
    pub min: f64,
    pub max: f64,
}

impl Default for ScoreScale {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
        }
    }
}

impl ScoreScale {
    pub fn unit() -> Self {
        Self { min: 0.0, max: 1.0 }
    }

    /// Neutral default used whenever a score is missing or unusable.
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Map a value on this scale onto [0, 1].
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max > self.min
    }
}

/// Per-dimension weights. Used both for the composite and for the
/// weighted-integration strategy, each with its own values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub environment: f64,
    pub social: f64,
    pub governance: f64,
}

impl DimensionWeights {
    pub const fn new(environment: f64, social: f64, governance: f64) -> Self {
        Self {
            environment,
            social,
            governance,
        }
    }

    /// Composite default. Governance carries the extra 0.01 so totals never
    /// split into exact thirds.
    pub const fn composite_default() -> Self {
        Self::new(0.33, 0.33, 0.34)
    }

    pub const fn integration_default() -> Self {
        Self::new(0.4, 0.3, 0.3)
    }

    pub fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Environment => self.environment,
            Dimension::Social => self.social,
            Dimension::Governance => self.governance,
        }
    }

    pub fn total(&self) -> f64 {
        self.environment + self.social + self.governance
    }

    /// True when every weight is non-negative and they sum to 1.
    pub fn is_convex(&self) -> bool {
        Dimension::ALL
            .iter()
            .all(|d| self.weight(*d).is_finite() && self.weight(*d) >= 0.0)
            && (self.total() - 1.0).abs() < 1e-6
    }

    /// Weighted sum where a missing dimension reads as `neutral`.
    pub fn blend(&self, scores: &DimensionScores, neutral: f64) -> f64 {
        Dimension::ALL
            .iter()
            .map(|d| self.weight(*d) * scores.get(d).copied().unwrap_or(neutral))
            .sum()
    }
}

/// Static, locator-level description of a firm. Loaded from config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirmProfile {
    pub id: FirmId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// SEC Central Index Key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cik: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// ISO country code used for macro indicators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Fixed text appended to every disclosure of this firm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
}

impl FirmProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: FirmId::new(id),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Placeholder firm used when no roster is configured.
    pub fn virtual_firm(index: usize) -> Self {
        Self::new(index.to_string(), format!("Firm-{index}"))
    }

    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_cik(mut self, cik: impl Into<String>) -> Self {
        self.cik = Some(cik.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Market lookups fall back to the display name when no ticker is set.
    pub fn ticker_or_name(&self) -> &str {
        self.ticker.as_deref().unwrap_or(&self.name)
    }
}

/// One firm's reportable information. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Disclosure {
    text: Arc<str>,
    sources: Vec<String>,
}

impl Disclosure {
    pub fn new(text: impl Into<Arc<str>>, sources: Vec<String>) -> Self {
        Self {
            text: text.into(),
            sources,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Names of the data sources that contributed a line.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

/// A firm in the orchestrator's roster.
#[derive(Debug)]
pub struct Firm {
    profile: FirmProfile,
    disclosure: OnceCell<Disclosure>,
    capital_this_round: f64,
    capital_total: f64,
}

impl Firm {
    pub fn new(profile: FirmProfile) -> Self {
        Self {
            profile,
            disclosure: OnceCell::new(),
            capital_this_round: 0.0,
            capital_total: 0.0,
        }
    }

    pub fn id(&self) -> &FirmId {
        &self.profile.id
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &FirmProfile {
        &self.profile
    }

    pub fn capital_this_round(&self) -> f64 {
        self.capital_this_round
    }

    pub fn capital_total(&self) -> f64 {
        self.capital_total
    }

    /// The memoized disclosure, if one has been generated.
    pub fn cached_disclosure(&self) -> Option<&Disclosure> {
        self.disclosure.get()
    }

    pub(crate) fn disclosure_slot(&self) -> &OnceCell<Disclosure> {
        &self.disclosure
    }

    pub(crate) fn reset_round(&mut self) {
        self.capital_this_round = 0.0;
    }

    pub(crate) fn receive(&mut self, amount: f64) {
        self.capital_this_round += amount;
        self.capital_total += amount;
    }
}

/// Discrete rating label produced by a classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(pub String);

impl Rating {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Read-only per-round view of one firm, derived from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedView {
    pub firm: FirmId,
    pub environment: f64,
    pub social: f64,
    pub governance: f64,
    pub composite: f64,
    pub rating: Rating,
    pub return_proxy: f64,
}

impl AggregatedView {
    pub fn score(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Environment => self.environment,
            Dimension::Social => self.social,
            Dimension::Governance => self.governance,
        }
    }

    pub fn scores(&self) -> DimensionScores {
        Dimension::ALL.iter().map(|d| (*d, self.score(*d))).collect()
    }
}

/// Which investment strategy produced an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Exclusion,
    Merit,
    WeightedIntegration,
    Thematic,
    Proportional,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyKind::Exclusion => "exclusion",
            StrategyKind::Merit => "merit",
            StrategyKind::WeightedIntegration => "weighted_integration",
            StrategyKind::Thematic => "thematic",
            StrategyKind::Proportional => "proportional",
        };
        f.write_str(s)
    }
}

/// Capital granted (or explicitly withheld) by one investor to one firm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub investor: String,
    pub firm: FirmId,
    pub strategy: StrategyKind,
    pub amount: f64,
}

/// Whether independent work inside a round runs concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Sequential,
    #[default]
    Parallel,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─── ScoreScale ─────────────────────────────────────────────

    #[test]
    fn test_scale_midpoint() {
        assert!((ScoreScale::default().midpoint() - 50.0).abs() < f64::EPSILON);
        assert!((ScoreScale::unit().midpoint() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scale_contains_rejects_non_finite() {
        let scale = ScoreScale::default();
        assert!(scale.contains(0.0));
        assert!(scale.contains(100.0));
        assert!(!scale.contains(100.1));
        assert!(!scale.contains(-0.1));
        assert!(!scale.contains(f64::NAN));
        assert!(!scale.contains(f64::INFINITY));
    }

    #[test]
    fn test_scale_normalize() {
        let scale = ScoreScale::default();
        assert!((scale.normalize(75.0) - 0.75).abs() < 1e-12);
        assert_eq!(scale.normalize(250.0), 1.0);
        let degenerate = ScoreScale { min: 1.0, max: 1.0 };
        assert_eq!(degenerate.normalize(1.0), 0.0);
        assert!(!degenerate.is_valid());
    }

    // ─── DimensionWeights ───────────────────────────────────────

    #[test]
    fn test_default_weights_are_convex() {
        assert!(DimensionWeights::composite_default().is_convex());
        assert!(DimensionWeights::integration_default().is_convex());
        assert!(!DimensionWeights::new(0.5, 0.5, 0.5).is_convex());
        assert!(!DimensionWeights::new(1.2, -0.1, -0.1).is_convex());
    }

    #[test]
    fn test_blend_missing_reads_neutral() {
        let w = DimensionWeights::composite_default();
        let mut scores = DimensionScores::new();
        scores.insert(Dimension::Environment, 80.0);
        let blended = w.blend(&scores, 50.0);
        let expected = 0.33 * 80.0 + 0.33 * 50.0 + 0.34 * 50.0;
        assert!((blended - expected).abs() < 1e-9);
    }

    // ─── Firm ───────────────────────────────────────────────────

    #[test]
    fn test_firm_capital_accumulates() {
        let mut firm = Firm::new(FirmProfile::new("a", "Alpha"));
        firm.receive(100.0);
        firm.receive(30.0);
        assert!((firm.capital_this_round() - 130.0).abs() < f64::EPSILON);
        firm.reset_round();
        assert_eq!(firm.capital_this_round(), 0.0);
        assert!((firm.capital_total() - 130.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ticker_falls_back_to_name() {
        let p = FirmProfile::new("1", "Sinopec");
        assert_eq!(p.ticker_or_name(), "Sinopec");
        let p = p.with_ticker("SNP");
        assert_eq!(p.ticker_or_name(), "SNP");
    }

    #[test]
    fn test_virtual_firm_naming() {
        let p = FirmProfile::virtual_firm(2);
        assert_eq!(p.id, FirmId::new("2"));
        assert_eq!(p.name, "Firm-2");
    }

    #[test]
    fn test_strategy_kind_display() {
        assert_eq!(
            StrategyKind::WeightedIntegration.to_string(),
            "weighted_integration"
        );
        assert_eq!(StrategyKind::Exclusion.to_string(), "exclusion");
    }
}
