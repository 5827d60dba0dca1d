use serde::Deserialize;
use serde_json::Value;

/// Read a price or volume that providers encode either as a JSON number or
/// as a decimal string.
pub fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub fn value_to_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Epoch seconds to milliseconds; `None` when the value cannot be a real
/// timestamp.
pub fn secs_to_ms(secs: u64) -> Option<u64> {
    secs.checked_mul(1000)
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Kraken envelope: `{"error": [...], "result": {<pair>: [...], "last": n}}`.
#[derive(Debug, Deserialize)]
pub struct KrakenOhlcResponse {
    #[serde(default)]
    pub error: Vec<String>,
    #[serde(default)]
    pub result: serde_json::Map<String, Value>,
}

/// MEXC contract kline: column arrays under `data`.
#[derive(Debug, Deserialize)]
pub struct MexcKlineResponse {
    #[serde(default)]
    pub success: bool,
    pub data: Option<MexcKlineColumns>,
}

#[derive(Debug, Deserialize)]
pub struct MexcKlineColumns {
    pub time: Vec<u64>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub vol: Vec<f64>,
}

/// Yahoo chart API, only the fields needed for candles.
#[derive(Debug, Deserialize)]
pub struct YahooChartResponse {
    pub chart: YahooChart,
}

#[derive(Debug, Deserialize)]
pub struct YahooChart {
    pub result: Option<Vec<YahooChartResult>>,
}

#[derive(Debug, Deserialize)]
pub struct YahooChartResult {
    pub timestamp: Option<Vec<u64>>,
    pub indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
pub struct YahooIndicators {
    #[serde(default)]
    pub quote: Vec<YahooQuote>,
}

#[derive(Debug, Default, Deserialize)]
pub struct YahooQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}
