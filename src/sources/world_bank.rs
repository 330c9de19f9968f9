// src/sources/world_bank.rs - Macroeconomic indicator for the firm's country

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{get_json, scalar, DataSource};
use crate::core::types::FirmProfile;
use crate::infra::errors::EsgError;

pub struct WorldBankIndicator {
    client: reqwest::Client,
    indicator: String,
    default_country: String,
}

impl WorldBankIndicator {
    pub fn new(
        client: reqwest::Client,
        indicator: impl Into<String>,
        default_country: impl Into<String>,
    ) -> Self {
        Self {
            client,
            indicator: indicator.into(),
            default_country: default_country.into(),
        }
    }
}

const SOURCE: &str = "world_bank";

/// `country` and `indicator` are escaped as single path segments.
pub fn indicator_url(country: &str, indicator: &str) -> Result<Url, EsgError> {
    let mut url = Url::parse("https://api.worldbank.org/v2/country")
        .map_err(|e| EsgError::source_failure(SOURCE, e))?;
    url.path_segments_mut()
        .map_err(|()| EsgError::source_failure(SOURCE, "base URL cannot hold a path"))?
        .push(country)
        .push("indicator")
        .push(indicator);
    url.query_pairs_mut()
        .append_pair("format", "json")
        .append_pair("per_page", "5");
    Ok(url)
}

/// The API answers `[metadata, [entries...]]`; null values are skipped.
pub fn parse_indicator(country: &str, indicator: &str, body: &Value) -> Option<String> {
    let entries: Vec<String> = body
        .get(1)?
        .as_array()?
        .iter()
        .filter_map(|e| {
            let value = scalar(&e["value"])?;
            let date = scalar(&e["date"])?;
            Some(format!("{date}:{value}"))
        })
        .collect();
    if entries.is_empty() {
        return None;
    }
    Some(format!("{country} {indicator}: {}", entries.join("; ")))
}

#[async_trait]
impl DataSource for WorldBankIndicator {
    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self, firm: &FirmProfile) -> Result<Option<String>, EsgError> {
        let country = firm.country.as_deref().unwrap_or(&self.default_country);
        if country.is_empty() {
            return Ok(None);
        }
        let url = indicator_url(country, &self.indicator)?;
        let body = get_json(&self.client, self.name(), url).await?;
        Ok(parse_indicator(country, &self.indicator, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_indicator_url() {
        let url = indicator_url("CN", "NY.GDP.PCAP.CD").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.worldbank.org/v2/country/CN/indicator/NY.GDP.PCAP.CD?format=json&per_page=5"
        );
    }

    #[test]
    fn test_indicator_url_escapes_country() {
        let url = indicator_url("C/N?x=1", "NY.GDP.PCAP.CD").unwrap();
        assert_eq!(url.path(), "/v2/country/C%2FN%3Fx=1/indicator/NY.GDP.PCAP.CD");
        assert_eq!(url.query(), Some("format=json&per_page=5"));
    }

    #[test]
    fn test_parse_indicator_skips_nulls() {
        let body = json!([
            {"page": 1},
            [
                {"date": "2023", "value": null},
                {"date": "2022", "value": 12720.2},
                {"date": "2021", "value": 12617.5}
            ]
        ]);
        assert_eq!(
            parse_indicator("CN", "NY.GDP.PCAP.CD", &body),
            Some("CN NY.GDP.PCAP.CD: 2022:12720.2; 2021:12617.5".into())
        );
    }

    #[test]
    fn test_parse_indicator_error_payload() {
        let body = json!([{"message": [{"id": "120", "value": "Invalid value"}]}]);
        assert!(parse_indicator("XX", "NY.GDP.PCAP.CD", &body).is_none());
    }
}
