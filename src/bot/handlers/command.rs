use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::{error, warn};

use crate::alerts::{AlertEngine, UserId};
use crate::bot::commands::Command;
use crate::errors::{AlertError, BotError};
use crate::rates::RateSource;
use crate::utils::{alert_set_message, rates_summary, Config};

use super::menu::create_main_menu;

const ALERT_USAGE: &str =
    "Usage: /alert [CURRENCY_PAIR] [THRESHOLD_RATE]\nExample: /alert USD/NGN 850";

/// Handlers for bot commands
pub struct CommandHandler;

impl CommandHandler {
    /// Handle /start: welcome message with the main menu
    pub async fn handle_start(bot: Bot, msg: Message) -> ResponseResult<()> {
        bot.send_message(
            msg.chat.id,
            "Welcome to the Exchange Rate Bot! Please choose an option below:",
        )
        .reply_markup(create_main_menu())
        .await?;

        Ok(())
    }

    /// Handle /rate: fetch and render today's rates
    pub async fn handle_rate(
        bot: Bot,
        msg: Message,
        rates: Arc<dyn RateSource>,
        config: Arc<Config>,
    ) -> ResponseResult<()> {
        let message = match rates.fetch().await {
            Ok(snapshot) => rates_summary(&snapshot, &config.tracked_pairs),
            Err(e) => {
                warn!("💱 /rate fetch failed: {}", e);
                "Failed to fetch exchange rates. Please try again later.".to_string()
            }
        };

        bot.send_message(msg.chat.id, message).await?;
        Ok(())
    }

    /// Handle /alert PAIR THRESHOLD
    pub async fn handle_alert(
        bot: Bot,
        msg: Message,
        args: String,
        engine: Arc<AlertEngine>,
    ) -> ResponseResult<()> {
        let parts: Vec<&str> = args.split_whitespace().collect();
        if parts.len() != 2 {
            bot.send_message(msg.chat.id, ALERT_USAGE).await?;
            return Ok(());
        }

        let user = UserId(msg.chat.id.0);
        let message = match engine.set_alert(user, parts[0], parts[1]).await {
            Ok(alert) => alert_set_message(&alert.pair, alert.threshold),
            Err(BotError::InvalidInput(reason)) => {
                format!("{}\n\n{}", reason, ALERT_USAGE)
            }
            Err(e) => {
                error!("🔔 Failed to set alert for user {}: {}", user, e);
                "Something went wrong setting your alert. Please try again.".to_string()
            }
        };

        bot.send_message(msg.chat.id, message).await?;
        Ok(())
    }

    /// Handle /cancel: stop monitoring and retire the current alert
    pub async fn handle_cancel(
        bot: Bot,
        msg: Message,
        engine: Arc<AlertEngine>,
    ) -> ResponseResult<()> {
        engine.cancel_monitoring(UserId(msg.chat.id.0)).await;
        bot.send_message(msg.chat.id, "Alert monitoring cancelled.")
            .await?;
        Ok(())
    }

    /// Handle /help
    pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
        bot.send_message(msg.chat.id, Command::descriptions().to_string())
            .await?;
        Ok(())
    }

    /// Start monitoring the user's current alert; shared between the
    /// inline button and command paths.
    pub async fn start_monitoring_reply(engine: &AlertEngine, user: UserId) -> String {
        match engine.start_monitoring(user).await {
            Ok(_) => "Alert monitoring started.".to_string(),
            Err(BotError::Alert(AlertError::NoActiveAlert)) => {
                "No alert set. Use /alert first.".to_string()
            }
            Err(BotError::Alert(AlertError::AlreadyScheduled { pair })) => {
                format!("Alert monitoring is already running for {}.", pair)
            }
            Err(e) => {
                error!("⏰ Failed to start monitoring for user {}: {}", user, e);
                "Could not start monitoring. Please try again.".to_string()
            }
        }
    }
}
