use std::sync::Arc;
use std::time::Duration;

use teloxide::Bot;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fx_rate_bot::{
    alerts::{AlertEngine, AlertStore},
    bot::TelegramBot,
    notify::{Notifier, TelegramNotifier},
    rates::{OpenExchangeRatesClient, RateSource},
    utils::Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::from_env()?);
    config.validate()?;

    let bot = Bot::new(config.telegram_bot_token.clone());

    let rates: Arc<dyn RateSource> = Arc::new(OpenExchangeRatesClient::new(
        config.exchange_api_key.clone(),
        config.tracked_pairs.clone(),
    ));
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(bot.clone()));
    let store = Arc::new(AlertStore::new());

    let engine = Arc::new(AlertEngine::new(
        store,
        rates.clone(),
        notifier,
        Duration::from_secs(config.first_check_delay_secs),
        Duration::from_secs(config.check_interval_secs),
    ));

    info!(
        "💱 Tracking {} pairs, checking every {}s",
        config.tracked_pairs.len(),
        config.check_interval_secs
    );

    TelegramBot::new(config, bot, engine, rates).run().await?;

    Ok(())
}
