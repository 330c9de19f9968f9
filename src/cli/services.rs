// src/cli/services.rs - Wire model providers into scoring and commentary services

use std::sync::Arc;

use crate::core::types::ScoreScale;
use crate::evaluator::commentary::LlmCommentator;
use crate::evaluator::judge::LlmScorer;
use crate::evaluator::{FixedScorer, ScoringService};
use crate::infra::config::ModelConfig;
use crate::provider::openai_compat::OpenAICompatProvider;
use crate::provider::retry::{RetryConfig, RetryProvider};
use crate::provider::ModelProvider;

/// Provider from config, or `None` when the API key variable is unset.
pub fn model_provider(config: &ModelConfig) -> Option<Arc<dyn ModelProvider>> {
    let key = std::env::var(&config.api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty())?;
    let base: Arc<dyn ModelProvider> = Arc::new(OpenAICompatProvider::new(
        config.provider.clone(),
        config.provider.clone(),
        key,
        config.base_url.clone(),
    ));
    Some(Arc::new(RetryProvider::with_config(
        base,
        RetryConfig {
            max_retries: config.max_retries,
            ..RetryConfig::default()
        },
    )))
}

/// LLM scorer when a provider is available, otherwise the neutral midpoint.
pub fn scoring_service(
    provider: Option<Arc<dyn ModelProvider>>,
    config: &ModelConfig,
    scale: ScoreScale,
) -> Arc<dyn ScoringService> {
    match provider {
        Some(p) => Arc::new(
            LlmScorer::new(p, config.model.clone(), scale).with_temperature(config.temperature),
        ),
        None => {
            tracing::warn!(
                key_env = %config.api_key_env,
                "No API key set, every score defaults to neutral"
            );
            Arc::new(FixedScorer::neutral(&scale))
        }
    }
}

pub fn commentator(provider: Arc<dyn ModelProvider>, config: &ModelConfig) -> LlmCommentator {
    LlmCommentator::new(provider, config.model.clone())
}
