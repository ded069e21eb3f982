use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

/// Top-level error type for the bot.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Alert(#[from] AlertError),

    #[error(transparent)]
    Rates(#[from] RateError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

impl BotError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Caller-state conflicts around alert scheduling. Reported, never retried.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("no active alert; set one with /alert first")]
    NoActiveAlert,

    #[error("alert monitoring already running for {pair}")]
    AlreadyScheduled { pair: String },
}

/// Failures while fetching exchange rates. Transient from the engine's
/// point of view: a failed tick is retried on the next one.
#[derive(Error, Debug)]
pub enum RateError {
    #[error("rate provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate provider returned malformed data: {0}")]
    MalformedResponse(String),

    #[error("rate provider unavailable: {0}")]
    Unavailable(String),
}

/// Notification delivery failures. Terminal for the single attempt;
/// the alert still retires.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("telegram delivery failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("notification rejected: {0}")]
    Rejected(String),
}
