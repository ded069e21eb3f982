use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::alerts::UserId;
use crate::errors::NotifyError;

/// Delivers a notification to a user. At-most-once: the engine never
/// retries a failed delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, user: UserId, text: &str) -> Result<(), NotifyError>;
}

/// Notifier backed by the Telegram Bot API.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, user: UserId, text: &str) -> Result<(), NotifyError> {
        self.bot.send_message(ChatId(user.0), text).await?;
        Ok(())
    }
}
