use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;
use crate::model::Candle;
use crate::net::ProxyRelay;

use super::types::{secs_to_ms, MexcKlineResponse};
use super::{normalize, soften, CandleSource, MAX_BARS};

/// MEXC contract klines, reached through the relay.
pub struct MexcKlineSource {
    relay: Arc<ProxyRelay>,
    base_url: String,
}

impl MexcKlineSource {
    pub fn new(relay: Arc<ProxyRelay>, base_url: &str) -> Self {
        Self {
            relay,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn kline_url(&self, contract: &str) -> String {
        format!(
            "{}/api/v1/contract/kline/{}?interval=Min5",
            self.base_url,
            contract.trim()
        )
    }

    async fn try_fetch(&self, contract: &str) -> Result<Vec<Candle>, AppError> {
        let body = self.relay.deliver(&self.kline_url(contract)).await?;
        parse_kline_columns(&body)
    }
}

#[async_trait]
impl CandleSource for MexcKlineSource {
    fn name(&self) -> &'static str {
        "mexc"
    }

    async fn fetch(&self, instrument: &str) -> Vec<Candle> {
        soften(self.name(), instrument, self.try_fetch(instrument).await)
    }
}

/// Zip the column arrays by index. Relays sometimes hand back an HTML page
/// with a 200 status; that surfaces here as a JSON error.
pub fn parse_kline_columns(body: &str) -> Result<Vec<Candle>, AppError> {
    let resp: MexcKlineResponse = serde_json::from_str(body)?;
    if !resp.success {
        return Err(AppError::parse("mexc reported success=false"));
    }
    let cols = resp
        .data
        .ok_or_else(|| AppError::parse("mexc response has no data"))?;

    let len = cols.time.len();
    let lengths = [
        cols.open.len(),
        cols.high.len(),
        cols.low.len(),
        cols.close.len(),
        cols.vol.len(),
    ];
    if lengths.iter().any(|&l| l != len) {
        return Err(AppError::parse(format!(
            "mexc column lengths differ: time={} others={:?}",
            len, lengths
        )));
    }

    let start = len.saturating_sub(MAX_BARS);
    let candles = (start..len)
        .map(|i| {
            let timestamp_ms = secs_to_ms(cols.time[i])
                .ok_or_else(|| AppError::parse(format!("mexc time {} is out of range", cols.time[i])))?;
            Ok(Candle::new(
                timestamp_ms,
                cols.open[i],
                cols.high[i],
                cols.low[i],
                cols.close[i],
                cols.vol[i],
            ))
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    Ok(normalize(candles, MAX_BARS))
}
