// src/core/strategy.rs - First-match-wins investment strategy chain

use super::types::{AggregatedView, DimensionWeights, StrategyKind};
use crate::infra::config::StrategyConfig;

/// Tolerance for the closed integration boundary, so a blend that lands a
/// rounding error below the threshold still qualifies.
pub const EPSILON: f64 = 1e-9;

pub const DEFAULT_EXCLUSION_KEYWORDS: &[&str] = &[
    "环境污染",
    "强迫劳动",
    "贿赂",
    "高碳排放",
    "道德风险",
    "pollution incident",
    "forced labor",
    "bribery",
    "high carbon emissions",
    "moral hazard",
];

pub const DEFAULT_IMPACT_KEYWORDS: &[&str] = &[
    "可再生能源",
    "碳中和",
    "乡村振兴",
    "教育普惠",
    "可持续发展",
    "renewable energy",
    "carbon neutral",
    "rural revitalization",
    "inclusive education",
    "sustainable development",
];

/// The predicate half of a strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// Disclosure mentions any keyword.
    Exclusion { keywords: Vec<String> },
    /// Composite strictly above the threshold.
    Merit { threshold: f64 },
    /// Re-weighted dimension blend at or above the threshold.
    WeightedIntegration {
        weights: DimensionWeights,
        threshold: f64,
    },
    /// Disclosure mentions any keyword.
    Thematic { keywords: Vec<String> },
}

impl Screen {
    pub fn exclusion<S: AsRef<str>>(keywords: &[S]) -> Self {
        Screen::Exclusion {
            keywords: lowercase_all(keywords),
        }
    }

    pub fn thematic<S: AsRef<str>>(keywords: &[S]) -> Self {
        Screen::Thematic {
            keywords: lowercase_all(keywords),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Screen::Exclusion { .. } => StrategyKind::Exclusion,
            Screen::Merit { .. } => StrategyKind::Merit,
            Screen::WeightedIntegration { .. } => StrategyKind::WeightedIntegration,
            Screen::Thematic { .. } => StrategyKind::Thematic,
        }
    }

    /// `disclosure` must already be lowercased.
    fn matches(&self, view: &AggregatedView, disclosure: &str) -> bool {
        match self {
            Screen::Exclusion { keywords } | Screen::Thematic { keywords } => {
                keywords.iter().any(|k| disclosure.contains(k.as_str()))
            }
            Screen::Merit { threshold } => view.composite > *threshold,
            Screen::WeightedIntegration { weights, threshold } => {
                weights.blend(&view.scores(), view.composite) + EPSILON >= *threshold
            }
        }
    }
}

fn lowercase_all<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Explicit zero allocation.
    Veto,
    Grant(f64),
}

impl Action {
    pub fn amount(&self) -> f64 {
        match self {
            Action::Veto => 0.0,
            Action::Grant(amount) => *amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub screen: Screen,
    pub action: Action,
}

impl Strategy {
    pub fn new(screen: Screen, action: Action) -> Self {
        Self { screen, action }
    }
}

/// Outcome of the first matching strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub strategy: StrategyKind,
    pub amount: f64,
}

/// Ordered strategies. The first whose screen matches decides; later
/// strategies are not consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyChain {
    strategies: Vec<Strategy>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    /// Exclusion, merit, weighted integration, thematic.
    pub fn from_config(config: &StrategyConfig) -> Self {
        Self::new(vec![
            Strategy::new(Screen::exclusion(&config.exclusion_keywords), Action::Veto),
            Strategy::new(
                Screen::Merit {
                    threshold: config.merit_threshold,
                },
                Action::Grant(config.merit_unit),
            ),
            Strategy::new(
                Screen::WeightedIntegration {
                    weights: config.integration_weights,
                    threshold: config.integration_threshold,
                },
                Action::Grant(config.integration_unit),
            ),
            Strategy::new(
                Screen::thematic(&config.impact_keywords),
                Action::Grant(config.thematic_unit),
            ),
        ])
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// `None` means no strategy matched: the firm gets nothing this round.
    pub fn evaluate(&self, view: &AggregatedView, disclosure: &str) -> Option<Decision> {
        let lowered = disclosure.to_lowercase();
        self.strategies
            .iter()
            .find(|s| s.screen.matches(view, &lowered))
            .map(|s| Decision {
                strategy: s.screen.kind(),
                amount: s.action.amount(),
            })
    }
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::from_config(&StrategyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Dimension, FirmId, Rating};

    fn view(env: f64, soc: f64, gov: f64) -> AggregatedView {
        let composite = DimensionWeights::composite_default().blend(
            &[
                (Dimension::Environment, env),
                (Dimension::Social, soc),
                (Dimension::Governance, gov),
            ]
            .into_iter()
            .collect(),
            50.0,
        );
        AggregatedView {
            firm: FirmId::new("1"),
            environment: env,
            social: soc,
            governance: gov,
            composite,
            rating: Rating::new("A"),
            return_proxy: 1.0,
        }
    }

    fn decide(v: &AggregatedView, text: &str) -> Option<Decision> {
        StrategyChain::default().evaluate(v, text)
    }

    #[test]
    fn test_exclusion_beats_high_score() {
        let d = decide(&view(95.0, 95.0, 95.0), "Fined for BRIBERY in 2023").unwrap();
        assert_eq!(d.strategy, StrategyKind::Exclusion);
        assert_eq!(d.amount, 0.0);

        let d = decide(&view(95.0, 95.0, 95.0), "发生环境污染事件").unwrap();
        assert_eq!(d.strategy, StrategyKind::Exclusion);
    }

    #[test]
    fn test_merit_is_strict() {
        let d = decide(&view(80.0, 80.0, 80.0), "clean").unwrap();
        assert_eq!(d.strategy, StrategyKind::Merit);
        assert_eq!(d.amount, 100.0);

        // composite of exactly 75 falls through to integration
        let d = decide(&view(75.0, 75.0, 75.0), "clean").unwrap();
        assert_eq!(d.strategy, StrategyKind::WeightedIntegration);
        assert_eq!(d.amount, 50.0);
    }

    #[test]
    fn test_integration_boundary_is_closed() {
        let at = decide(&view(65.0, 65.0, 65.0), "clean").unwrap();
        assert_eq!(at.strategy, StrategyKind::WeightedIntegration);

        assert_eq!(decide(&view(64.999, 64.999, 64.999), "clean"), None);
    }

    #[test]
    fn test_integration_uses_its_own_weights() {
        // blend = 0.4*90 + 0.3*50 + 0.3*50 = 66, composite stays below merit
        let d = decide(&view(90.0, 50.0, 50.0), "clean").unwrap();
        assert_eq!(d.strategy, StrategyKind::WeightedIntegration);
    }

    #[test]
    fn test_thematic_is_case_insensitive() {
        let d = decide(&view(50.0, 50.0, 50.0), "Investing in Renewable Energy").unwrap();
        assert_eq!(d.strategy, StrategyKind::Thematic);
        assert_eq!(d.amount, 30.0);
    }

    #[test]
    fn test_no_match_yields_none() {
        assert_eq!(decide(&view(50.0, 50.0, 50.0), "ordinary year"), None);
    }

    #[test]
    fn test_custom_order_changes_outcome() {
        let chain = StrategyChain::new(vec![
            Strategy::new(Screen::thematic(&["solar"]), Action::Grant(5.0)),
            Strategy::new(Screen::Merit { threshold: 10.0 }, Action::Grant(1.0)),
        ]);
        let d = chain.evaluate(&view(90.0, 90.0, 90.0), "solar farm").unwrap();
        assert_eq!(d.strategy, StrategyKind::Thematic);
        assert_eq!(d.amount, 5.0);
    }

    #[test]
    fn test_blank_keywords_ignored() {
        let chain = StrategyChain::new(vec![Strategy::new(
            Screen::exclusion(&["", "  "]),
            Action::Veto,
        )]);
        assert_eq!(chain.evaluate(&view(50.0, 50.0, 50.0), "anything"), None);
    }
}
