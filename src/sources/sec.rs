// src/sources/sec.rs - SEC EDGAR company facts (board size)

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{get_json, scalar, DataSource};
use crate::core::types::FirmProfile;
use crate::infra::errors::EsgError;

pub struct SecEdgarFacts {
    client: reqwest::Client,
}

impl SecEdgarFacts {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// EDGAR expects the CIK zero-padded to ten digits.
pub fn normalize_cik(cik: &str) -> Option<String> {
    let digits = cik.trim().trim_start_matches("CIK");
    if digits.is_empty() || digits.len() > 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{digits:0>10}"))
}

pub fn parse_board_size(body: &Value) -> Option<String> {
    let units = body["facts"]["dei"]["BoardOfDirectorsMemberCount"]["units"].as_object()?;
    let first = units.values().find_map(|v| v.as_array()?.first())?;
    let count = scalar(&first["val"]).or_else(|| scalar(&first["value"]))?;
    Some(format!("Board members: {count}"))
}

#[async_trait]
impl DataSource for SecEdgarFacts {
    fn name(&self) -> &str {
        "sec_edgar"
    }

    async fn fetch(&self, firm: &FirmProfile) -> Result<Option<String>, EsgError> {
        let Some(cik) = firm.cik.as_deref().and_then(normalize_cik) else {
            return Ok(None);
        };
        let url = Url::parse(&format!(
            "https://data.sec.gov/api/xbrl/companyfacts/CIK{cik}.json"
        ))
        .map_err(|e| EsgError::source_failure(self.name(), e))?;
        let body = get_json(&self.client, self.name(), url).await?;
        Ok(parse_board_size(&body))
    }
}
