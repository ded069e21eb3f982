mod open_exchange;
mod source;
mod types;

pub use open_exchange::OpenExchangeRatesClient;
pub use source::RateSource;
pub use types::{CurrencyPair, RateSnapshot};
