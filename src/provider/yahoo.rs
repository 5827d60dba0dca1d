use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;
use crate::model::candle::{now_ms, Candle};
use crate::net::ProxyRelay;

use super::types::{round2, secs_to_ms, YahooChartResponse, YahooQuote};
use super::{normalize, soften, CandleSource};

/// The fallback quote source keeps a shorter window than the exchanges.
pub const YAHOO_MAX_BARS: usize = 60;

/// Yahoo chart API, reached through the relay. Used as the last link of the
/// metal and energy chains.
pub struct YahooChartSource {
    relay: Arc<ProxyRelay>,
    base_url: String,
}

impl YahooChartSource {
    pub fn new(relay: Arc<ProxyRelay>, base_url: &str) -> Self {
        Self {
            relay,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn chart_url(&self, symbol: &str, cache_buster: u64) -> String {
        format!(
            "{}/v8/finance/chart/{}?interval=5m&range=1d&includePrePost=false&useYfid=true&_={}",
            self.base_url,
            symbol.trim(),
            cache_buster
        )
    }

    async fn try_fetch(&self, symbol: &str) -> Result<Vec<Candle>, AppError> {
        let body = self.relay.deliver(&self.chart_url(symbol, now_ms())).await?;
        parse_chart(&body)
    }
}

#[async_trait]
impl CandleSource for YahooChartSource {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch(&self, instrument: &str) -> Vec<Candle> {
        soften(self.name(), instrument, self.try_fetch(instrument).await)
    }
}

fn column(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

/// Indices whose open is null are skipped. A missing high/low/close falls
/// back to the open, a missing volume counts as zero.
pub fn parse_chart(body: &str) -> Result<Vec<Candle>, AppError> {
    let resp: YahooChartResponse = serde_json::from_str(body)?;
    let result = resp
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| AppError::parse("yahoo chart has no result"))?;
    let timestamps = result
        .timestamp
        .ok_or_else(|| AppError::parse("yahoo chart has no timestamps"))?;
    let quote: YahooQuote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| AppError::parse("yahoo chart has no quote"))?;

    let mut candles = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(open) = column(&quote.open, i) else {
            continue;
        };
        let high = column(&quote.high, i).unwrap_or(open);
        let low = column(&quote.low, i).unwrap_or(open);
        let close = column(&quote.close, i).unwrap_or(open);
        let volume = column(&quote.volume, i).unwrap_or(0.0);
        let timestamp_ms = secs_to_ms(*ts)
            .ok_or_else(|| AppError::parse(format!("yahoo timestamp {} is out of range", ts)))?;
        candles.push(Candle::new(
            timestamp_ms,
            round2(open),
            round2(high),
            round2(low),
            round2(close),
            volume,
        ));
    }
    Ok(normalize(candles, YAHOO_MAX_BARS))
}
