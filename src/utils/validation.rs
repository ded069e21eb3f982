use crate::errors::{BotError, Result};
use crate::rates::CurrencyPair;

pub struct Validator;

impl Validator {
    /// Parse a "BASE/QUOTE" pair, case-insensitively, normalizing to
    /// uppercase.
    pub fn validate_pair(input: &str) -> Result<CurrencyPair> {
        input.parse()
    }

    /// Parse a threshold rate as a base-10 float; must be finite and
    /// positive.
    pub fn validate_threshold(input: &str) -> Result<f64> {
        let threshold: f64 = input
            .trim()
            .parse()
            .map_err(|_| BotError::invalid_input(format!("'{}' is not a number", input.trim())))?;

        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(BotError::invalid_input(format!(
                "threshold must be a positive number (got {})",
                threshold
            )));
        }

        Ok(threshold)
    }
}
