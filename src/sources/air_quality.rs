// src/sources/air_quality.rs - OpenAQ PM2.5 for the firm's city

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{get_json, scalar, DataSource};
use crate::core::types::FirmProfile;
use crate::infra::errors::EsgError;

const OPENAQ_LATEST_URL: &str = "https://api.openaq.org/v2/latest";

pub struct OpenAqPm25 {
    client: reqwest::Client,
}

impl OpenAqPm25 {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

pub fn parse_openaq_latest(city: &str, body: &Value) -> Option<String> {
    let measurement = body["results"]
        .as_array()?
        .first()?["measurements"]
        .as_array()?
        .first()?;
    let value = scalar(&measurement["value"])?;
    Some(format!("{city} PM2.5: {value} µg/m³"))
}

#[async_trait]
impl DataSource for OpenAqPm25 {
    fn name(&self) -> &str {
        "openaq"
    }

    async fn fetch(&self, firm: &FirmProfile) -> Result<Option<String>, EsgError> {
        let Some(ref city) = firm.city else {
            return Ok(None);
        };
        let url = Url::parse_with_params(
            OPENAQ_LATEST_URL,
            &[("city", city.as_str()), ("parameter", "pm25"), ("limit", "1")],
        )
        .map_err(|e| EsgError::source_failure(self.name(), e))?;
        let body = get_json(&self.client, self.name(), url).await?;
        Ok(parse_openaq_latest(city, &body))
    }
}
