use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::model::Candle;
use crate::net::HttpTransport;

use super::types::{value_to_f64, value_to_u64};
use super::{normalize, soften, CandleSource, MAX_BARS};

/// Binance spot klines, fetched directly without a relay.
pub struct BinanceKlineSource {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    timeout: Duration,
}

impl BinanceKlineSource {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str, timeout: Duration) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn klines_url(&self, symbol: &str) -> String {
        format!(
            "{}/api/v3/klines?symbol={}&interval=5m&limit={}",
            self.base_url,
            symbol.trim().to_ascii_uppercase(),
            MAX_BARS
        )
    }

    async fn try_fetch(&self, symbol: &str) -> Result<Vec<Candle>, AppError> {
        let url = self.klines_url(symbol);
        let body = self.transport.get_text(&url, self.timeout).await?;
        parse_klines(&body)
    }
}

#[async_trait]
impl CandleSource for BinanceKlineSource {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn fetch(&self, instrument: &str) -> Vec<Candle> {
        soften(self.name(), instrument, self.try_fetch(instrument).await)
    }
}

/// Rows are positional: `[open_time_ms, open, high, low, close, volume, ...]`.
pub fn parse_klines(body: &str) -> Result<Vec<Candle>, AppError> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    let mut candles = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        if row.len() < 6 {
            return Err(AppError::parse(format!(
                "kline row {} has {} fields, expected at least 6",
                idx,
                row.len()
            )));
        }
        let field = |i: usize| {
            value_to_f64(&row[i])
                .ok_or_else(|| AppError::parse(format!("kline row {} field {} is not numeric", idx, i)))
        };
        let open_time = value_to_u64(&row[0])
            .ok_or_else(|| AppError::parse(format!("kline row {} has no open time", idx)))?;
        candles.push(Candle::new(
            open_time,
            field(1)?,
            field(2)?,
            field(3)?,
            field(4)?,
            field(5)?,
        ));
    }
    Ok(normalize(candles, MAX_BARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_rows() {
        let body = r#"[
            [1700000000000,"37000.1","37010.0","36990.5","37005.2","12.5",1700000299999,"0",10,"0","0","0"],
            [1700000300000,"37005.2","37020.0","37000.0","37015.0","8.25",1700000599999,"0",7,"0","0","0"]
        ]"#;
        let candles = parse_klines(body).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp_ms, 1_700_000_000_000);
        assert!((candles[1].close - 37015.0).abs() < f64::EPSILON);
        assert!((candles[1].volume - 8.25).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_short_rows_and_error_objects() {
        assert!(parse_klines(r#"[[1700000000000,"1","2"]]"#).is_err());
        assert!(parse_klines(r#"{"code":-1121,"msg":"Invalid symbol."}"#).is_err());
    }

    #[test]
    fn klines_url_uppercases_symbol() {
        struct Never;
        #[async_trait]
        impl HttpTransport for Never {
            async fn get_text(&self, _url: &str, _t: Duration) -> Result<String, AppError> {
                Err(AppError::Timeout(0))
            }
        }
        let src = BinanceKlineSource::new(
            Arc::new(Never),
            "https://api.binance.com/",
            Duration::from_secs(5),
        );
        assert_eq!(
            src.klines_url("paxgusdt"),
            "https://api.binance.com/api/v3/klines?symbol=PAXGUSDT&interval=5m&limit=100"
        );
    }
}
