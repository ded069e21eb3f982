use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::alerts::types::{Alert, AlertStatus, UserId};
use crate::errors::{BotError, Result};
use crate::rates::CurrencyPair;

/// In-memory set of alerts, one slot per user. Setting a new alert
/// replaces whatever the user had (last-write-wins); multiple concurrent
/// alerts per user are a documented non-feature. Nothing here survives a
/// process restart.
#[derive(Default)]
pub struct AlertStore {
    alerts: RwLock<HashMap<UserId, Alert>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the user's alert. Any ScheduledJob attached to
    /// the previous alert must already be cancelled by the caller.
    pub async fn set_alert(
        &self,
        user: UserId,
        pair: CurrencyPair,
        threshold: f64,
    ) -> Result<Alert> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(BotError::invalid_input(format!(
                "threshold must be a positive number (got {})",
                threshold
            )));
        }

        let alert = Alert {
            user,
            pair,
            threshold,
            created_at: Utc::now(),
            status: AlertStatus::Pending,
        };

        self.alerts.write().await.insert(user, alert.clone());
        Ok(alert)
    }

    /// The user's most recently set alert, unless it already reached a
    /// terminal state.
    pub async fn active_alert(&self, user: UserId) -> Option<Alert> {
        self.alerts
            .read()
            .await
            .get(&user)
            .filter(|a| a.status.is_active())
            .cloned()
    }

    pub async fn mark_scheduled(&self, user: UserId, pair: &CurrencyPair) -> bool {
        self.transition(user, pair, AlertStatus::Scheduled).await
    }

    /// Idempotent terminal transition; a no-op when the alert is absent,
    /// points at a different pair, or is already terminal.
    pub async fn mark_triggered(&self, user: UserId, pair: &CurrencyPair) -> bool {
        self.transition(user, pair, AlertStatus::Triggered).await
    }

    /// Idempotent terminal transition, same no-op rules as mark_triggered.
    pub async fn mark_cancelled(&self, user: UserId, pair: &CurrencyPair) -> bool {
        self.transition(user, pair, AlertStatus::Cancelled).await
    }

    async fn transition(&self, user: UserId, pair: &CurrencyPair, to: AlertStatus) -> bool {
        let mut alerts = self.alerts.write().await;
        let Some(alert) = alerts.get_mut(&user) else {
            debug!("🔔 No alert to transition for user {}", user);
            return false;
        };

        if alert.pair != *pair || alert.status.is_terminal() {
            return false;
        }

        alert.status = to;
        true
    }
}
