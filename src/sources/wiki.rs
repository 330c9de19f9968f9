// src/sources/wiki.rs - Encyclopedia summary (Wikipedia REST API)

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{get_json, DataSource};
use crate::core::types::FirmProfile;
use crate::infra::errors::EsgError;

const SUMMARY_SENTENCES: usize = 2;

pub struct WikiSummary {
    client: reqwest::Client,
    language: String,
}

impl WikiSummary {
    pub fn new(client: reqwest::Client, language: impl Into<String>) -> Self {
        Self {
            client,
            language: language.into(),
        }
    }

    fn summary_url(&self, title: &str) -> Result<Url, EsgError> {
        let base = format!(
            "https://{}.wikipedia.org/api/rest_v1/page/summary/",
            self.language
        );
        let mut url = Url::parse(&base).map_err(|e| EsgError::source_failure("wikipedia", e))?;
        url.path_segments_mut()
            .map_err(|_| EsgError::source_failure("wikipedia", "URL cannot be a base"))?
            .pop_if_empty()
            .push(title);
        Ok(url)
    }
}

/// Keep the first `n` sentences. Handles both CJK and Latin terminators.
pub fn first_sentences(text: &str, n: usize) -> &str {
    let mut seen = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        let terminal = match c {
            '。' | '！' | '？' => true,
            '.' | '!' | '?' => chars.peek().map_or(true, |(_, next)| next.is_whitespace()),
            _ => false,
        };
        if terminal {
            seen += 1;
            if seen == n {
                return &text[..idx + c.len_utf8()];
            }
        }
    }
    text
}

pub fn parse_summary(body: &Value) -> Option<String> {
    let extract = body["extract"].as_str()?.trim();
    if extract.is_empty() {
        return None;
    }
    Some(first_sentences(extract, SUMMARY_SENTENCES).to_string())
}

#[async_trait]
impl DataSource for WikiSummary {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn fetch(&self, firm: &FirmProfile) -> Result<Option<String>, EsgError> {
        let url = self.summary_url(&firm.name)?;
        let body = get_json(&self.client, self.name(), url).await?;
        Ok(parse_summary(&body))
    }
}
