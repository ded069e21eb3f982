//! Utility functions for formatting user-facing bot messages

use crate::rates::{CurrencyPair, RateSnapshot};

/// Format a rate for display with two decimal places
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}", rate)
}

/// Render the /rate summary for the tracked pairs
pub fn rates_summary(snapshot: &RateSnapshot, pairs: &[CurrencyPair]) -> String {
    let mut message = String::from("Today's Exchange Rates:");
    for pair in pairs {
        match snapshot.rate(pair) {
            Some(rate) => {
                message.push_str(&format!("\n- {}: {}", pair, format_rate(rate)));
            }
            None => {
                message.push_str(&format!("\n- {}: unavailable", pair));
            }
        }
    }
    message
}

/// Confirmation shown after an alert is set
pub fn alert_set_message(pair: &CurrencyPair, threshold: f64) -> String {
    format!(
        "Alert set for {} when it crosses {}.",
        pair,
        format_rate(threshold)
    )
}

/// Notification sent when an alert triggers
pub fn alert_triggered_message(pair: &CurrencyPair, rate: f64, threshold: f64) -> String {
    format!(
        "Alert! {} has hit {}, crossing your threshold of {}.",
        pair,
        format_rate(rate),
        format_rate(threshold)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    fn pair(s: &str) -> CurrencyPair {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(850.0), "850.00");
        assert_eq!(format_rate(1650.456), "1650.46");
    }

    #[test]
    fn test_alert_triggered_message() {
        let msg = alert_triggered_message(&pair("USD/NGN"), 850.0, 850.0);
        assert_eq!(
            msg,
            "Alert! USD/NGN has hit 850.00, crossing your threshold of 850.00."
        );
    }

    #[test]
    fn test_rates_summary_marks_missing_pairs() {
        let usd = pair("USD/NGN");
        let gbp = pair("GBP/NGN");
        let snapshot = RateSnapshot::new(HashMap::from([(usd.clone(), 1650.5)]), Utc::now());

        let summary = rates_summary(&snapshot, &[usd, gbp]);
        assert!(summary.contains("USD/NGN: 1650.50"));
        assert!(summary.contains("GBP/NGN: unavailable"));
    }
}
