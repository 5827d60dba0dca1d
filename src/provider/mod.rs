//! Provider adapters.
//!
//! Every adapter normalizes one external feed into [`Candle`]s and is
//! fail-soft: transport errors, relay exhaustion and parse failures are
//! logged and come back as an empty vector, which is what lets the router
//! fall through to the next link of a chain.

pub mod binance;
pub mod kraken;
pub mod mexc;
pub mod types;
pub mod yahoo;

use async_trait::async_trait;

use crate::error::AppError;
use crate::model::Candle;

pub use binance::BinanceKlineSource;
pub use kraken::KrakenOhlcSource;
pub use mexc::MexcKlineSource;
pub use yahoo::YahooChartSource;

/// Upper bound on bars any adapter returns.
pub const MAX_BARS: usize = 100;

#[async_trait]
pub trait CandleSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Most recent bars for `instrument`, oldest first. Empty on any failure.
    async fn fetch(&self, instrument: &str) -> Vec<Candle>;
}

/// Downgrade an adapter result to the fail-soft contract.
pub(crate) fn soften(
    source: &'static str,
    instrument: &str,
    result: Result<Vec<Candle>, AppError>,
) -> Vec<Candle> {
    match result {
        Ok(candles) => {
            tracing::debug!(source, instrument, count = candles.len(), "provider fetch ok");
            candles
        }
        Err(e) => {
            tracing::warn!(source, instrument, error = %e, "provider fetch failed, falling back");
            Vec::new()
        }
    }
}

/// Order by timestamp, drop duplicates and non-finite rows, keep the newest
/// `max` entries.
pub(crate) fn normalize(mut candles: Vec<Candle>, max: usize) -> Vec<Candle> {
    candles.retain(|c| {
        [c.open, c.high, c.low, c.close, c.volume]
            .iter()
            .all(|v| v.is_finite())
    });
    candles.sort_by_key(|c| c.timestamp_ms);
    candles.dedup_by_key(|c| c.timestamp_ms);
    if candles.len() > max {
        candles.drain(..candles.len() - max);
    }
    candles
}
