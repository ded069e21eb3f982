use std::sync::Arc;
use teloxide::{prelude::*, types::CallbackQuery};
use tracing::warn;

use crate::alerts::{AlertEngine, UserId};
use crate::rates::RateSource;
use crate::utils::{rates_summary, Config};

use super::command::CommandHandler;

/// Handler for callback queries from inline keyboards
pub struct CallbackHandler;

impl CallbackHandler {
    pub async fn handle(
        bot: Bot,
        q: CallbackQuery,
        engine: Arc<AlertEngine>,
        rates: Arc<dyn RateSource>,
        config: Arc<Config>,
    ) -> ResponseResult<()> {
        bot.answer_callback_query(q.id.clone()).await?;

        let Some(data) = q.data.as_deref() else {
            return Ok(());
        };

        let Some(msg) = q.regular_message() else {
            return Ok(());
        };

        match data {
            "get_rates" => {
                let text = match rates.fetch().await {
                    Ok(snapshot) => rates_summary(&snapshot, &config.tracked_pairs),
                    Err(e) => {
                        warn!("💱 Rates button fetch failed: {}", e);
                        "Failed to fetch exchange rates. Please try again later.".to_string()
                    }
                };
                bot.edit_message_text(msg.chat.id, msg.id, text).await?;
            }

            "set_alert" => {
                bot.edit_message_text(
                    msg.chat.id,
                    msg.id,
                    "Please use the format: /alert [CURRENCY_PAIR] [THRESHOLD_RATE]\n\
                     Example: /alert USD/NGN 850",
                )
                .await?;
            }

            "schedule_alert" => {
                let user = UserId(msg.chat.id.0);
                let text = CommandHandler::start_monitoring_reply(&engine, user).await;
                bot.edit_message_text(msg.chat.id, msg.id, text).await?;
            }

            _ => {}
        }

        Ok(())
    }
}
