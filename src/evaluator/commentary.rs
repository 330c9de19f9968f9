// src/evaluator/commentary.rs - LLM commentary for the analyze command

use std::sync::Arc;

use async_trait::async_trait;

use super::CommentaryService;
use crate::infra::errors::EsgError;
use crate::provider::{ChatRequest, Message, ModelProvider};

/// Shown when the commentary service is unavailable.
pub const FALLBACK_COMMENTARY: &str = "ESG assessment: The company shows average ESG \
performance with room for improvement.\nInvestment advice: Monitor its sustainability \
progress before increasing exposure.";

pub struct LlmCommentator {
    provider: Arc<dyn ModelProvider>,
    model: String,
    temperature: f32,
}

impl LlmCommentator {
    pub fn new(provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.3,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl CommentaryService for LlmCommentator {
    async fn commentary(&self, disclosure: &str, score_summary: &str) -> Result<String, EsgError> {
        let prompt = format!(
            "## Disclosure\n{disclosure}\n\n\
             ## Scores\n{score_summary}\n\n\
             Write two short sections:\n\
             ESG assessment: strengths and weaknesses in one paragraph.\n\
             Investment advice: one paragraph for a long-term investor."
        );

        let response = self
            .provider
            .chat(ChatRequest {
                model: self.model.clone(),
                messages: vec![Message::user(prompt)],
                max_tokens: Some(600),
                temperature: Some(self.temperature),
                system: Some("You are a professional ESG analyst.".into()),
            })
            .await?;

        Ok(response.content)
    }
}

/// Run the commentator, substituting the fallback text on any failure.
pub async fn commentary_or_fallback(
    service: &dyn CommentaryService,
    disclosure: &str,
    score_summary: &str,
) -> String {
    match service.commentary(disclosure, score_summary).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::warn!("Commentary service returned an empty reply");
            FALLBACK_COMMENTARY.to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Commentary unavailable, using fallback");
            FALLBACK_COMMENTARY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::parser::parse_commentary;

    struct Broken;

    #[async_trait]
    impl CommentaryService for Broken {
        async fn commentary(&self, _: &str, _: &str) -> Result<String, EsgError> {
            Err(EsgError::Provider {
                provider: "deepseek".into(),
                message: "503".into(),
                retriable: true,
            })
        }
    }

    struct Echo(&'static str);

    #[async_trait]
    impl CommentaryService for Echo {
        async fn commentary(&self, _: &str, _: &str) -> Result<String, EsgError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_fallback_on_error() {
        let text = commentary_or_fallback(&Broken, "d", "s").await;
        assert_eq!(text, FALLBACK_COMMENTARY);
    }

    #[tokio::test]
    async fn test_fallback_on_blank_reply() {
        let text = commentary_or_fallback(&Echo("  \n"), "d", "s").await;
        assert_eq!(text, FALLBACK_COMMENTARY);
    }

    #[tokio::test]
    async fn test_reply_passes_through() {
        let text = commentary_or_fallback(&Echo("ESG assessment: fine"), "d", "s").await;
        assert_eq!(text, "ESG assessment: fine");
    }

    #[test]
    fn test_fallback_has_both_sections() {
        let parsed = parse_commentary(FALLBACK_COMMENTARY);
        assert!(!parsed.assessment.is_empty());
        assert!(!parsed.advice.is_empty());
    }
}
