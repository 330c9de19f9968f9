// src/sources/market.rs - Market price lines (Yahoo quote, Alpha Vantage daily close)

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{get_json, scalar, DataSource};
use crate::core::types::FirmProfile;
use crate::infra::errors::EsgError;

const YAHOO_QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";

pub struct YahooQuote {
    client: reqwest::Client,
}

impl YahooQuote {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Format the first quote result as "<ticker> price: <p>; PE(TTM): <pe>".
pub fn parse_yahoo_quote(ticker: &str, body: &Value) -> Option<String> {
    let quote = body["quoteResponse"]["result"].as_array()?.first()?;
    let price = scalar(&quote["regularMarketPrice"]);
    let pe = scalar(&quote["trailingPE"]);
    if price.is_none() && pe.is_none() {
        return None;
    }
    Some(format!(
        "{ticker} price: {}; PE(TTM): {}",
        price.as_deref().unwrap_or("N/A"),
        pe.as_deref().unwrap_or("N/A")
    ))
}

#[async_trait]
impl DataSource for YahooQuote {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, firm: &FirmProfile) -> Result<Option<String>, EsgError> {
        let ticker = firm.ticker_or_name().to_uppercase();
        let url = Url::parse_with_params(YAHOO_QUOTE_URL, &[("symbols", ticker.as_str())])
            .map_err(|e| EsgError::source_failure(self.name(), e))?;
        let body = get_json(&self.client, self.name(), url).await?;
        Ok(parse_yahoo_quote(&ticker, &body))
    }
}

pub struct AlphaVantageDaily {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl AlphaVantageDaily {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

/// Pick the most recent trading day from a TIME_SERIES_DAILY payload.
pub fn parse_alpha_vantage_daily(ticker: &str, body: &Value) -> Option<String> {
    let series = body["Time Series (Daily)"].as_object()?;
    // ISO dates sort lexicographically
    let (date, bar) = series.iter().max_by(|a, b| a.0.cmp(b.0))?;
    let close = scalar(&bar["4. close"])?;
    Some(format!("{ticker} {date} close: {close}"))
}

#[async_trait]
impl DataSource for AlphaVantageDaily {
    fn name(&self) -> &str {
        "alpha_vantage"
    }

    async fn fetch(&self, firm: &FirmProfile) -> Result<Option<String>, EsgError> {
        let Some(ref key) = self.api_key else {
            return Ok(None);
        };
        let ticker = firm.ticker_or_name().to_uppercase();
        let url = Url::parse_with_params(
            ALPHA_VANTAGE_URL,
            &[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", ticker.as_str()),
                ("outputsize", "compact"),
                ("apikey", key.as_str()),
            ],
        )
        .map_err(|e| EsgError::source_failure(self.name(), e))?;
        let body = get_json(&self.client, self.name(), url).await?;
        Ok(parse_alpha_vantage_daily(&ticker, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_yahoo_quote() {
        let body = json!({
            "quoteResponse": {
                "result": [{"regularMarketPrice": 187.5, "trailingPE": 29.1}]
            }
        });
        assert_eq!(
            parse_yahoo_quote("AAPL", &body),
            Some("AAPL price: 187.5; PE(TTM): 29.1".into())
        );
    }

    #[test]
    fn test_parse_yahoo_quote_partial() {
        let body = json!({"quoteResponse": {"result": [{"regularMarketPrice": 3.2}]}});
        assert_eq!(
            parse_yahoo_quote("601857.SS", &body),
            Some("601857.SS price: 3.2; PE(TTM): N/A".into())
        );
    }

    #[test]
    fn test_parse_yahoo_quote_empty() {
        let body = json!({"quoteResponse": {"result": []}});
        assert!(parse_yahoo_quote("NOPE", &body).is_none());
        assert!(parse_yahoo_quote("NOPE", &json!({})).is_none());
    }

    #[test]
    fn test_parse_alpha_vantage_latest_day() {
        let body = json!({
            "Time Series (Daily)": {
                "2024-05-01": {"4. close": "101.00"},
                "2024-05-03": {"4. close": "103.50"},
                "2024-05-02": {"4. close": "102.25"}
            }
        });
        assert_eq!(
            parse_alpha_vantage_daily("IBM", &body),
            Some("IBM 2024-05-03 close: 103.50".into())
        );
    }

    #[test]
    fn test_parse_alpha_vantage_error_payload() {
        let body = json!({"Error Message": "Invalid API call."});
        assert!(parse_alpha_vantage_daily("IBM", &body).is_none());
    }

    #[tokio::test]
    async fn test_alpha_vantage_without_key_is_silent() {
        let source = AlphaVantageDaily::new(reqwest::Client::new(), None);
        let line = source.fetch(&FirmProfile::new("1", "IBM")).await.unwrap();
        assert!(line.is_none());
    }
}
