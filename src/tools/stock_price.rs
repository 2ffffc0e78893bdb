use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;

use super::Tool;

/// Instrument metadata returned by the market-data source. Every price
/// field is optional; resolution walks them in priority order.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteInfo {
    current_price: Option<f64>,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
}

impl QuoteInfo {
    /// Fallback chain: live trading price, then regular-market price, then
    /// previous official close. The first present field wins.
    fn resolve_price(&self) -> Option<f64> {
        self.current_price
            .or(self.regular_market_price)
            .or(self.previous_close)
    }
}

/// Live stock price lookup against a single market-data source.
///
/// Any failure — unresolved ticker, missing price fields, transport fault —
/// is absorbed into the returned string so the researcher agent can reason
/// about it in natural language.
#[derive(Clone)]
pub struct StockPriceTool {
    client: Client,
    base_url: String,
}

impl StockPriceTool {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent("market_agents/0.1.0")
            .build()
            .context("Failed to create market data HTTP client")?;

        Ok(Self {
            client,
            base_url: config.market_data_base_url.clone(),
        })
    }

    async fn fetch_quote(&self, ticker: &str) -> Result<QuoteInfo> {
        let url = format!("{}/quote/{}", self.base_url, ticker);
        debug!("Fetching quote from {}", url);
        let quote = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .context("market data request failed")?
            .json()
            .await
            .context("malformed quote metadata")?;
        Ok(quote)
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Useful to get the live stock price. Input: Ticker symbol (e.g., 'TATASTEEL.NS')."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Ticker symbol, e.g. 'TATASTEEL.NS'"
                }
            },
            "required": ["ticker"]
        })
    }

    async fn invoke(&self, args: &Value) -> String {
        let Some(ticker) = args.get("ticker").and_then(Value::as_str) else {
            return "Error: missing 'ticker' argument.".to_string();
        };
        let ticker = ticker.trim();

        info!("Looking up live price for {}", ticker);
        match self.fetch_quote(ticker).await {
            Ok(quote) => match quote.resolve_price() {
                Some(price) => format!("The live price of {} is ₹{}", ticker, price),
                None => format!("Error: Price not found for {}.", ticker),
            },
            Err(e) => format!("Error: {:#}", e),
        }
    }
}
