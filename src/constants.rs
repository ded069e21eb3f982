/// Base URL of the Open Exchange Rates API.
pub const OPEN_EXCHANGE_RATES_BASE_URL: &str = "https://openexchangerates.org/api";

/// Pairs shown by /rate when TRACKED_PAIRS is not configured.
pub const DEFAULT_TRACKED_PAIRS: &[&str] = &["USD/NGN", "GBP/NGN", "EUR/NGN"];

/// How often a scheduled alert re-evaluates, in seconds.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;

/// Delay before the first evaluation after monitoring starts, in seconds.
pub const DEFAULT_FIRST_CHECK_DELAY_SECS: u64 = 10;

/// Consecutive fetch failures logged at warn level before dropping to debug.
pub const MAX_LOGGED_FETCH_FAILURES: u32 = 5;
