use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::constants::OPEN_EXCHANGE_RATES_BASE_URL;
use crate::errors::RateError;
use crate::rates::{CurrencyPair, RateSnapshot, RateSource};

/// Open Exchange Rates client. The provider quotes everything relative to
/// USD, so cross rates are derived as rates[quote] / rates[base].
pub struct OpenExchangeRatesClient {
    client: Client,
    base_url: String,
    app_id: String,
    pairs: Vec<CurrencyPair>,
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    base: String,
    rates: HashMap<String, f64>,
}

impl OpenExchangeRatesClient {
    pub fn new(app_id: impl Into<String>, pairs: Vec<CurrencyPair>) -> Self {
        Self {
            client: Client::new(),
            base_url: OPEN_EXCHANGE_RATES_BASE_URL.to_string(),
            app_id: app_id.into(),
            pairs,
        }
    }

    /// Point the client at a different endpoint (local stub server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl RateSource for OpenExchangeRatesClient {
    async fn fetch(&self) -> Result<RateSnapshot, RateError> {
        let url = format!("{}/latest.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("app_id", self.app_id.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let parsed: LatestRatesResponse = serde_json::from_slice(&body)
            .map_err(|e| RateError::MalformedResponse(e.to_string()))?;

        // The provider's base currency carries an implicit rate of 1.
        let mut table = parsed.rates;
        table.entry(parsed.base.to_uppercase()).or_insert(1.0);

        let mut rates = HashMap::with_capacity(self.pairs.len());
        for pair in &self.pairs {
            let (Some(&quote), Some(&base)) = (table.get(pair.quote()), table.get(pair.base()))
            else {
                warn!("💱 Provider response is missing a currency for {}", pair);
                continue;
            };

            if !base.is_finite() || !quote.is_finite() || base <= 0.0 || quote <= 0.0 {
                warn!("💱 Provider returned a non-positive rate for {}", pair);
                continue;
            }

            rates.insert(pair.clone(), quote / base);
        }

        if rates.is_empty() && !self.pairs.is_empty() {
            return Err(RateError::MalformedResponse(
                "no usable rates for any tracked pair".to_string(),
            ));
        }

        debug!("💱 Fetched {} rates from provider", rates.len());

        Ok(RateSnapshot::new(rates, Utc::now()))
    }
}
