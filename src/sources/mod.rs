// src/sources/mod.rs - Data-provider collaborators for disclosures
//
// Every source turns a firm profile into at most one informational line.
// `Ok(None)` means "nothing to add"; callers treat errors the same way.

pub mod air_quality;
pub mod fallback;
pub mod market;
pub mod sec;
pub mod wiki;
pub mod world_bank;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::core::types::FirmProfile;
use crate::infra::config::SourcesConfig;
use crate::infra::errors::EsgError;

/// Core trait that all disclosure data sources implement.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, firm: &FirmProfile) -> Result<Option<String>, EsgError>;
}

/// Build the standard source list in disclosure order.
pub fn default_sources(config: &SourcesConfig) -> Vec<Arc<dyn DataSource>> {
    if !config.enabled {
        return Vec::new();
    }

    let client = http_client(config);
    let alpha_key = std::env::var(&config.alpha_vantage_key_env).ok();

    vec![
        Arc::new(fallback::FallbackSource::new(
            "market",
            vec![
                Arc::new(market::YahooQuote::new(client.clone())),
                Arc::new(market::AlphaVantageDaily::new(client.clone(), alpha_key)),
            ],
        )),
        Arc::new(air_quality::OpenAqPm25::new(client.clone())),
        Arc::new(wiki::WikiSummary::new(
            client.clone(),
            config.wiki_language.clone(),
        )),
        Arc::new(sec::SecEdgarFacts::new(client.clone())),
        Arc::new(world_bank::WorldBankIndicator::new(
            client,
            config.indicator.clone(),
            config.default_country.clone(),
        )),
    ]
}

fn http_client(config: &SourcesConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client ({e}), using defaults");
            reqwest::Client::new()
        })
}

/// GET a URL and decode the body as JSON.
pub(crate) async fn get_json(
    client: &reqwest::Client,
    source: &str,
    url: Url,
) -> Result<serde_json::Value, EsgError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| EsgError::source_failure(source, e))?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(EsgError::source_failure(source, format!("HTTP {status}")));
    }

    response
        .json()
        .await
        .map_err(|e| EsgError::source_failure(source, e))
}

/// Render a JSON scalar without quotes; `None` for null/missing.
pub(crate) fn scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(scalar(&json!(12.5)), Some("12.5".into()));
        assert_eq!(scalar(&json!("abc")), Some("abc".into()));
        assert_eq!(scalar(&json!("  ")), None);
        assert_eq!(scalar(&json!(null)), None);
        assert_eq!(scalar(&json!([1, 2])), None);
    }

    #[test]
    fn test_disabled_sources_are_empty() {
        let config = SourcesConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(default_sources(&config).is_empty());
    }

    #[test]
    fn test_default_source_order() {
        let sources = default_sources(&SourcesConfig::default());
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["market", "openaq", "wikipedia", "sec_edgar", "world_bank"]
        );
    }
}
