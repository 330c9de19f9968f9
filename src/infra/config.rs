// src/infra/config.rs - Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::aggregator::DEFAULT_RETURN_NORMALIZATION;
use crate::core::investor::{DEFAULT_POOL, DEFAULT_SCORE_WEIGHT};
use crate::core::rating::{default_bands, RatingBand, DEFAULT_FLOOR};
use crate::core::strategy::{DEFAULT_EXCLUSION_KEYWORDS, DEFAULT_IMPACT_KEYWORDS};
use crate::core::types::{DimensionWeights, FirmProfile, ScoreScale};
use crate::infra::errors::EsgError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub scale: ScoreScale,

    #[serde(default)]
    pub aggregation: AggregationConfig,

    #[serde(default)]
    pub rating: RatingConfig,

    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub proportional: ProportionalConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    /// Explicit roster. Empty means `simulation.virtual_firms` placeholders.
    #[serde(default)]
    pub firms: Vec<FirmProfile>,

    /// Explicit investors. Empty means `simulation.investors` strategy-chain investors.
    #[serde(default)]
    pub investors: Vec<InvestorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub rounds: u32,
    pub parallel_scoring: bool,
    pub virtual_firms: usize,
    pub investors: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            parallel_scoring: true,
            virtual_firms: 3,
            investors: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Capital that moves the return proxy by 1.0.
    pub return_normalization: f64,
    pub weights: DimensionWeights,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            return_normalization: DEFAULT_RETURN_NORMALIZATION,
            weights: DimensionWeights::composite_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Label for scores below every band.
    pub floor: String,
    pub bands: Vec<RatingBand>,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            floor: DEFAULT_FLOOR.into(),
            bands: default_bands(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub merit_threshold: f64,
    pub merit_unit: f64,
    pub integration_threshold: f64,
    pub integration_unit: f64,
    pub thematic_unit: f64,
    pub exclusion_keywords: Vec<String>,
    pub impact_keywords: Vec<String>,
    pub integration_weights: DimensionWeights,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            merit_threshold: 75.0,
            merit_unit: 100.0,
            integration_threshold: 65.0,
            integration_unit: 50.0,
            thematic_unit: 30.0,
            exclusion_keywords: DEFAULT_EXCLUSION_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            impact_keywords: DEFAULT_IMPACT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            integration_weights: DimensionWeights::integration_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProportionalConfig {
    pub pool: f64,
    /// Share of the weight taken by the normalized composite; the rest is return proxy.
    pub score_weight: f64,
}

impl Default for ProportionalConfig {
    fn default() -> Self {
        Self {
            pool: DEFAULT_POOL,
            score_weight: DEFAULT_SCORE_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "deepseek".into(),
            base_url: "https://api.deepseek.com".into(),
            model: "deepseek-chat".into(),
            api_key_env: "DEEPSEEK_API_KEY".into(),
            temperature: 0.1,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub wiki_language: String,
    pub alpha_vantage_key_env: String,
    /// World Bank indicator code.
    pub indicator: String,
    pub default_country: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 10,
            user_agent: format!("esgsim/{} (research simulation)", env!("CARGO_PKG_VERSION")),
            wiki_language: "zh".into(),
            alpha_vantage_key_env: "ALPHAVANTAGE_API_KEY".into(),
            indicator: "NY.GDP.PCAP.CD".into(),
            default_country: "CN".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    StrategyChain,
    Proportional,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvestorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub policy: PolicyKind,
}

impl Config {
    /// Load config from the default location, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        match paths::config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Thresholds and rating bands are on the same scale as the scores.
    /// A unit scale with the 0-100 defaults would leave every firm at the
    /// floor rating with no capital, so it is rejected here.
    pub fn validate(&self) -> Result<(), EsgError> {
        let scale = self.scale;
        if !scale.is_valid() {
            return Err(EsgError::Config(format!(
                "score scale [{}, {}] is empty",
                scale.min, scale.max
            )));
        }

        let thresholds = [
            ("strategy.merit_threshold", self.strategy.merit_threshold),
            ("strategy.integration_threshold", self.strategy.integration_threshold),
        ];
        for (key, value) in thresholds {
            if !scale.contains(value) {
                return Err(EsgError::Config(format!(
                    "{key} = {value} lies outside the score scale [{}, {}]",
                    scale.min, scale.max
                )));
            }
        }

        if let Some(band) = self.rating.bands.iter().find(|b| !scale.contains(b.min_score)) {
            return Err(EsgError::Config(format!(
                "rating band '{}' starts at {} outside the score scale [{}, {}]",
                band.label, band.min_score, scale.min, scale.max
            )));
        }
        Ok(())
    }
}
