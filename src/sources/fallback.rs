// src/sources/fallback.rs - First-success chain over several sources

use std::sync::Arc;

use async_trait::async_trait;

use super::DataSource;
use crate::core::types::FirmProfile;
use crate::infra::errors::EsgError;

/// Tries each candidate in order; the first one that yields a line wins.
pub struct FallbackSource {
    name: String,
    candidates: Vec<Arc<dyn DataSource>>,
}

impl FallbackSource {
    pub fn new(name: impl Into<String>, candidates: Vec<Arc<dyn DataSource>>) -> Self {
        Self {
            name: name.into(),
            candidates,
        }
    }
}

#[async_trait]
impl DataSource for FallbackSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, firm: &FirmProfile) -> Result<Option<String>, EsgError> {
        for candidate in &self.candidates {
            match candidate.fetch(firm).await {
                Ok(Some(line)) => return Ok(Some(line)),
                Ok(None) => {
                    tracing::debug!(
                        source = candidate.name(),
                        firm = %firm.id,
                        "Source had nothing, trying fallback"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        source = candidate.name(),
                        firm = %firm.id,
                        "Source failed, trying fallback: {}",
                        e
                    );
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned {
        name: &'static str,
        reply: Result<Option<&'static str>, ()>,
    }

    #[async_trait]
    impl DataSource for Canned {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _firm: &FirmProfile) -> Result<Option<String>, EsgError> {
            match self.reply {
                Ok(line) => Ok(line.map(String::from)),
                Err(()) => Err(EsgError::source_failure(self.name, "down")),
            }
        }
    }

    fn canned(name: &'static str, reply: Result<Option<&'static str>, ()>) -> Arc<dyn DataSource> {
        Arc::new(Canned { name, reply })
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let chain = FallbackSource::new(
            "market",
            vec![
                canned("a", Err(())),
                canned("b", Ok(None)),
                canned("c", Ok(Some("price 10"))),
                canned("d", Ok(Some("price 11"))),
            ],
        );
        let line = chain.fetch(&FirmProfile::new("1", "X")).await.unwrap();
        assert_eq!(line, Some("price 10".into()));
    }

    #[tokio::test]
    async fn test_all_failures_yield_none() {
        let chain = FallbackSource::new("market", vec![canned("a", Err(())), canned("b", Ok(None))]);
        let line = chain.fetch(&FirmProfile::new("1", "X")).await.unwrap();
        assert!(line.is_none());
    }
}
