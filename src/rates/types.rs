use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::errors::BotError;

static PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{3})/([A-Za-z]{3})$").unwrap());

/// An ordered pair of currency codes, e.g. USD/NGN. Normalized to
/// uppercase on construction; the canonical string form is "BASE/QUOTE".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    base: String,
    quote: String,
}

impl CurrencyPair {
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }
}

impl FromStr for CurrencyPair {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = PAIR_RE.captures(s.trim()).ok_or_else(|| {
            BotError::invalid_input(format!(
                "currency pair must look like BASE/QUOTE, e.g. USD/NGN (got '{}')",
                s.trim()
            ))
        })?;

        Ok(Self {
            base: caps[1].to_uppercase(),
            quote: caps[2].to_uppercase(),
        })
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// A point-in-time set of currency-pair rates. Immutable once built; a
/// failed fetch yields an error upstream, never a partial snapshot.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    rates: HashMap<CurrencyPair, f64>,
    fetched_at: DateTime<Utc>,
}

impl RateSnapshot {
    pub fn new(rates: HashMap<CurrencyPair, f64>, fetched_at: DateTime<Utc>) -> Self {
        Self { rates, fetched_at }
    }

    pub fn rate(&self, pair: &CurrencyPair) -> Option<f64> {
        self.rates.get(pair).copied()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_parse_normalizes_case() {
        let pair: CurrencyPair = "usd/ngn".parse().unwrap();
        assert_eq!(pair.base(), "USD");
        assert_eq!(pair.quote(), "NGN");
        assert_eq!(pair.to_string(), "USD/NGN");
    }

    #[test]
    fn test_pair_parse_rejects_malformed() {
        assert!("USDNGN".parse::<CurrencyPair>().is_err());
        assert!("US/NGN".parse::<CurrencyPair>().is_err());
        assert!("USD/NG1".parse::<CurrencyPair>().is_err());
        assert!("USD/NGN/EUR".parse::<CurrencyPair>().is_err());
        assert!("".parse::<CurrencyPair>().is_err());
    }

    #[test]
    fn test_snapshot_lookup() {
        let pair: CurrencyPair = "USD/NGN".parse().unwrap();
        let snapshot = RateSnapshot::new(
            HashMap::from([(pair.clone(), 850.0)]),
            Utc::now(),
        );

        assert_eq!(snapshot.rate(&pair), Some(850.0));
        assert_eq!(snapshot.rate(&"EUR/NGN".parse().unwrap()), None);
    }
}
