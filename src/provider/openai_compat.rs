// src/provider/openai_compat.rs - Generic OpenAI-compatible chat provider
//
// Used for DeepSeek by default; any endpoint exposing `/chat/completions`
// with bearer auth works.

use std::time::Duration;

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use crate::infra::errors::EsgError;

/// Per-request timeout; the core never waits on a provider longer than this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAICompatProvider {
    id_str: String,
    name_str: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        api_key: String,
        base_url: String,
    ) -> Self {
        Self {
            id_str: id.into(),
            name_str: name.into(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn request_body(request: &ChatRequest) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        for m in &request.messages {
            messages.push(serde_json::json!({
                "role": m.role.as_str(),
                "content": m.content,
            }));
        }

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "stream": false,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        body
    }
}

/// Extract the reply text and usage from a chat-completions payload.
pub fn parse_chat_response(resp: &serde_json::Value) -> ChatResponse {
    let content = resp["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or("")
        .to_string();

    let usage = TokenUsage {
        input_tokens: resp["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        output_tokens: resp["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    };

    ChatResponse { content, usage }
}

/// Decode a raw response body. Malformed JSON surfaces as `EsgError::Json`.
pub fn decode_chat_body(body: &str) -> Result<ChatResponse, EsgError> {
    let resp: serde_json::Value = serde_json::from_str(body)?;
    Ok(parse_chat_response(&resp))
}

#[async_trait]
impl ModelProvider for OpenAICompatProvider {
    fn id(&self) -> &str {
        &self.id_str
    }

    fn name(&self) -> &str {
        &self.name_str
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, EsgError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(REQUEST_TIMEOUT)
            .json(&Self::request_body(&request))
            .send()
            .await
            .map_err(|e| EsgError::Provider {
                provider: self.id_str.clone(),
                message: e.to_string(),
                retriable: e.is_timeout() || e.is_connect(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(0);
            return Err(EsgError::RateLimited {
                provider: self.id_str.clone(),
                retry_after_ms,
            });
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(EsgError::Provider {
                provider: self.id_str.clone(),
                message: format!("HTTP {status}: {error_body}"),
                retriable: status.is_server_error(),
            });
        }

        let body = response.text().await.map_err(|e| EsgError::Provider {
            provider: self.id_str.clone(),
            message: e.to_string(),
            retriable: false,
        })?;

        decode_chat_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Message;

    #[test]
    fn test_request_body_includes_system_first() {
        let request = ChatRequest {
            model: "deepseek-chat".into(),
            messages: vec![Message::user("Score this")],
            max_tokens: Some(16),
            temperature: Some(0.1),
            system: Some("You are a professional ESG analyst".into()),
        };
        let body = OpenAICompatProvider::request_body(&request);
        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Score this");
        assert_eq!(body["max_tokens"], 16);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_request_body_omits_unset_options() {
        let body = OpenAICompatProvider::request_body(&ChatRequest::default());
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("temperature").is_none());
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn test_parse_chat_response() {
        let resp = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "0.72"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 3}
        });
        let parsed = parse_chat_response(&resp);
        assert_eq!(parsed.content, "0.72");
        assert_eq!(parsed.usage.total(), 123);
    }

    #[test]
    fn test_parse_chat_response_empty() {
        let parsed = parse_chat_response(&serde_json::json!({}));
        assert!(parsed.content.is_empty());
        assert_eq!(parsed.usage.total(), 0);
    }

    #[test]
    fn test_decode_chat_body() {
        let body = r#"{"choices":[{"message":{"content":"72"}}],"usage":{"prompt_tokens":3,"completion_tokens":1}}"#;
        let parsed = decode_chat_body(body).unwrap();
        assert_eq!(parsed.content, "72");
    }

    #[test]
    fn test_decode_chat_body_malformed() {
        let err = decode_chat_body("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, EsgError::Json(_)));
        assert!(!err.is_retriable());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let p = OpenAICompatProvider::new("deepseek", "DeepSeek", "k".into(), "https://api.deepseek.com/".into());
        assert_eq!(p.base_url, "https://api.deepseek.com");
    }
}
