use serde::{Deserialize, Serialize};
use std::env;

use crate::constants::{
    DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_FIRST_CHECK_DELAY_SECS, DEFAULT_TRACKED_PAIRS,
};
use crate::errors::{BotError, Result};
use crate::rates::CurrencyPair;
use crate::utils::Validator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // API Keys
    pub telegram_bot_token: String,
    pub exchange_api_key: String,

    // Monitoring cadence
    pub check_interval_secs: u64,
    pub first_check_delay_secs: u64,

    // Pairs shown by /rate and computed by the provider client
    pub tracked_pairs: Vec<CurrencyPair>,

    // User Authorization
    pub allowed_users: Vec<i64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .map_err(|_| BotError::config("TELEGRAM_BOT_TOKEN not set"))?,
            exchange_api_key: env::var("EXCHANGE_API_KEY")
                .map_err(|_| BotError::config("EXCHANGE_API_KEY not set"))?,

            check_interval_secs: env::var("CHECK_INTERVAL_SECS")
                .unwrap_or_else(|_| DEFAULT_CHECK_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS),
            first_check_delay_secs: env::var("FIRST_CHECK_DELAY_SECS")
                .unwrap_or_else(|_| DEFAULT_FIRST_CHECK_DELAY_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_FIRST_CHECK_DELAY_SECS),

            tracked_pairs: Self::parse_pairs(
                &env::var("TRACKED_PAIRS").unwrap_or_else(|_| DEFAULT_TRACKED_PAIRS.join(",")),
            )?,

            allowed_users: env::var("ALLOWED_USERS")
                .unwrap_or_else(|_| String::new())
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    s.trim()
                        .parse()
                        .map_err(|_| BotError::config(format!("bad user id '{}'", s.trim())))
                })
                .collect::<Result<Vec<i64>>>()?,
        })
    }

    fn parse_pairs(raw: &str) -> Result<Vec<CurrencyPair>> {
        raw.split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Validator::validate_pair)
            .collect()
    }

    pub fn is_user_allowed(&self, user_id: i64) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.contains(&user_id)
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram_bot_token.is_empty() {
            return Err(BotError::config("Telegram bot token is required"));
        }

        if self.exchange_api_key.is_empty() {
            return Err(BotError::config("Exchange rate API key is required"));
        }

        if self.check_interval_secs == 0 {
            return Err(BotError::config("CHECK_INTERVAL_SECS must be positive"));
        }

        if self.tracked_pairs.is_empty() {
            return Err(BotError::config("at least one tracked pair is required"));
        }

        Ok(())
    }
}
