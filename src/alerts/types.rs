use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rates::CurrencyPair;

/// Provider-assigned user identifier (Telegram chat id). Opaque to the
/// engine beyond equality and hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alert lifecycle. Triggered and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    Pending,
    Scheduled,
    Triggered,
    Cancelled,
}

impl AlertStatus {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Scheduled)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

/// One user's standing request to be notified when a pair reaches a
/// threshold rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub user: UserId,
    pub pair: CurrencyPair,
    pub threshold: f64,
    pub created_at: DateTime<Utc>,
    pub status: AlertStatus,
}
