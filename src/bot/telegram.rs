use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::info;

use crate::{alerts::AlertEngine, errors::Result, rates::RateSource, utils::Config};

use super::{
    commands::Command,
    handlers::{CallbackHandler, CommandHandler},
};

/// Main Telegram bot struct
pub struct TelegramBot {
    config: Arc<Config>,
    bot: Bot,
    engine: Arc<AlertEngine>,
    rates: Arc<dyn RateSource>,
}

impl TelegramBot {
    pub fn new(
        config: Arc<Config>,
        bot: Bot,
        engine: Arc<AlertEngine>,
        rates: Arc<dyn RateSource>,
    ) -> Self {
        Self {
            config,
            bot,
            engine,
            rates,
        }
    }

    /// Run the bot dispatcher
    pub async fn run(&self) -> Result<()> {
        info!("🤖 Starting Telegram bot...");

        self.bot.set_my_commands(Command::bot_commands()).await?;

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(Self::handle_command),
            )
            .branch(Update::filter_callback_query().endpoint(CallbackHandler::handle));

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![
                self.engine.clone(),
                self.rates.clone(),
                self.config.clone()
            ])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }

    /// Handle bot commands by delegating to CommandHandler
    async fn handle_command(
        bot: Bot,
        msg: Message,
        cmd: Command,
        engine: Arc<AlertEngine>,
        rates: Arc<dyn RateSource>,
        config: Arc<Config>,
    ) -> ResponseResult<()> {
        if !config.is_user_allowed(msg.chat.id.0) {
            bot.send_message(msg.chat.id, "⛔ Unauthorized access").await?;
            return Ok(());
        }

        info!("Processing command {:?} from chat {}", cmd, msg.chat.id);

        match cmd {
            Command::Start => {
                CommandHandler::handle_start(bot, msg).await?;
            }
            Command::Rate => {
                CommandHandler::handle_rate(bot, msg, rates, config).await?;
            }
            Command::Alert(args) => {
                CommandHandler::handle_alert(bot, msg, args, engine).await?;
            }
            Command::Cancel => {
                CommandHandler::handle_cancel(bot, msg, engine).await?;
            }
            Command::Help => {
                CommandHandler::handle_help(bot, msg).await?;
            }
        }

        Ok(())
    }
}
