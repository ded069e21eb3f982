use async_trait::async_trait;

use crate::errors::RateError;
use crate::rates::RateSnapshot;

/// A provider of current exchange rates. Pure query: every call is
/// independently fallible and the engine assumes no caching or timestamp
/// monotonicity across calls.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<RateSnapshot, RateError>;
}
