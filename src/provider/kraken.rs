use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::model::Candle;
use crate::net::ProxyRelay;

use super::types::{secs_to_ms, value_to_f64, value_to_u64, KrakenOhlcResponse};
use super::{normalize, soften, CandleSource, MAX_BARS};

/// Sentinel key Kraken always adds next to the pair data.
const SENTINEL_KEY: &str = "last";

/// Kraken answers under its own pair naming, which differs from the request
/// name for most legacy pairs.
const RESULT_KEY_ALIASES: &[(&str, &[&str])] = &[
    ("XAUUSD", &["XAUUSD", "XXAUZUSD"]),
    ("XBTUSD", &["XXBTZUSD", "XBTUSD"]),
    ("BTCUSD", &["XXBTZUSD", "XBTUSD"]),
    ("ETHUSD", &["XETHZUSD", "ETHUSD"]),
    ("PAXGUSD", &["PAXGUSD"]),
];

pub fn result_key_aliases(pair: &str) -> &'static [&'static str] {
    let pair = pair.trim().to_ascii_uppercase();
    RESULT_KEY_ALIASES
        .iter()
        .find(|(p, _)| *p == pair)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

/// Kraken public OHLC, reached through the relay.
pub struct KrakenOhlcSource {
    relay: Arc<ProxyRelay>,
    base_url: String,
}

impl KrakenOhlcSource {
    pub fn new(relay: Arc<ProxyRelay>, base_url: &str) -> Self {
        Self {
            relay,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn ohlc_url(&self, pair: &str) -> String {
        format!("{}/0/public/OHLC?pair={}&interval=5", self.base_url, pair.trim())
    }

    async fn try_fetch(&self, pair: &str) -> Result<Vec<Candle>, AppError> {
        let body = self.relay.deliver(&self.ohlc_url(pair)).await?;
        parse_ohlc(pair, &body)
    }
}

#[async_trait]
impl CandleSource for KrakenOhlcSource {
    fn name(&self) -> &'static str {
        "kraken"
    }

    async fn fetch(&self, instrument: &str) -> Vec<Candle> {
        soften(self.name(), instrument, self.try_fetch(instrument).await)
    }
}

/// Pick the result key holding the rows for `pair`.
///
/// The alias table is consulted first. For pairs it does not list, the only
/// key other than the `last` sentinel is taken; zero or several such keys is
/// an error rather than a guess.
pub fn select_result_key<'a>(
    pair: &str,
    result: &'a serde_json::Map<String, Value>,
) -> Result<&'a str, AppError> {
    for alias in result_key_aliases(pair) {
        if let Some(value) = result.get(*alias) {
            if !value.is_array() {
                return Err(AppError::parse(format!(
                    "kraken result key '{}' is not an array",
                    alias
                )));
            }
            return Ok(*alias);
        }
    }

    let mut candidates = result.keys().filter(|k| k.as_str() != SENTINEL_KEY);
    match (candidates.next(), candidates.next()) {
        (Some(key), None) => {
            tracing::debug!(pair, key = %key, "kraken result key chosen by elimination");
            Ok(key.as_str())
        }
        (None, _) => Err(AppError::parse("kraken result holds no data key")),
        (Some(_), Some(_)) => Err(AppError::parse(format!(
            "kraken result for {} has several data keys and no listed alias",
            pair
        ))),
    }
}

/// Rows are `[time_s, open, high, low, close, vwap, volume, count]`.
pub fn parse_ohlc(pair: &str, body: &str) -> Result<Vec<Candle>, AppError> {
    let resp: KrakenOhlcResponse = serde_json::from_str(body)?;
    if !resp.error.is_empty() {
        return Err(AppError::parse(format!(
            "kraken error: {}",
            resp.error.join(", ")
        )));
    }
    let key = select_result_key(pair, &resp.result)?;
    let rows = resp
        .result
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::parse(format!("kraken result '{}' is not an array", key)))?;

    let start = rows.len().saturating_sub(MAX_BARS);
    let mut candles = Vec::with_capacity(rows.len() - start);
    for (idx, row) in rows[start..].iter().enumerate() {
        let fields = row
            .as_array()
            .filter(|f| f.len() >= 7)
            .ok_or_else(|| AppError::parse(format!("kraken row {} is malformed", idx)))?;
        let num = |i: usize| {
            value_to_f64(&fields[i])
                .ok_or_else(|| AppError::parse(format!("kraken row {} field {} is not numeric", idx, i)))
        };
        let timestamp_ms = value_to_u64(&fields[0])
            .and_then(secs_to_ms)
            .ok_or_else(|| AppError::parse(format!("kraken row {} has no valid time", idx)))?;
        candles.push(Candle::new(
            timestamp_ms,
            num(1)?,
            num(2)?,
            num(3)?,
            num(4)?,
            num(6)?,
        ));
    }
    Ok(normalize(candles, MAX_BARS))
}
