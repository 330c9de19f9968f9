// src/evaluator/judge.rs - LLM-backed dimension scoring

use std::sync::Arc;

use async_trait::async_trait;

use super::parser::parse_score_reply;
use super::ScoringService;
use crate::core::types::ScoreScale;
use crate::infra::errors::EsgError;
use crate::provider::{ChatRequest, Message, ModelProvider};

/// Asks a chat model for a single number rating one ESG dimension.
pub struct LlmScorer {
    provider: Arc<dyn ModelProvider>,
    model: String,
    scale: ScoreScale,
    temperature: f32,
}

impl LlmScorer {
    pub fn new(provider: Arc<dyn ModelProvider>, model: impl Into<String>, scale: ScoreScale) -> Self {
        Self {
            provider,
            model: model.into(),
            scale,
            temperature: 0.1,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn prompt(&self, disclosure: &str, dimension: &str) -> String {
        format!(
            "Rate the {dimension} performance of the company described below.\n\n\
             ## Disclosure\n{disclosure}\n\n\
             Reply with a single number between {min} and {max}. No other text.",
            min = self.scale.min,
            max = self.scale.max,
        )
    }
}

#[async_trait]
impl ScoringService for LlmScorer {
    async fn score(&self, disclosure: &str, dimension: &str) -> Result<f64, EsgError> {
        let response = self
            .provider
            .chat(ChatRequest {
                model: self.model.clone(),
                messages: vec![Message::user(self.prompt(disclosure, dimension))],
                max_tokens: Some(16),
                temperature: Some(self.temperature),
                system: Some(
                    "You are a professional ESG analyst. You score corporate disclosures \
                     strictly and answer with numbers only."
                        .into(),
                ),
            })
            .await?;

        tracing::debug!(
            provider = self.provider.id(),
            dimension,
            tokens = response.usage.total(),
            "Score reply received"
        );

        parse_score_reply(&response.content).ok_or_else(|| EsgError::UnparseableScore {
            provider: self.provider.id().to_string(),
            reply: response.content,
        })
    }
}
