use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Fixed span of one candle: five minutes.
pub const BUCKET_MS: u64 = 5 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Local wall-clock label (`HH:MM`) of the bucket start.
    pub time: String,
    pub timestamp_ms: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp_ms: u64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time: time_label(timestamp_ms),
            timestamp_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Flat candle with every price at `price` and no volume.
    pub fn flat(timestamp_ms: u64, price: f64) -> Self {
        Self::new(timestamp_ms, price, price, price, price, 0.0)
    }

    /// `high` covers both open and close, `low` sits under both.
    pub fn is_well_formed(&self) -> bool {
        self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }
}

/// Index of the bucket containing `timestamp_ms`.
pub fn bucket_index(timestamp_ms: u64, bucket_ms: u64) -> u64 {
    assert!(bucket_ms > 0, "bucket_ms must be > 0");
    timestamp_ms / bucket_ms
}

/// Start of the bucket containing `timestamp_ms`.
pub fn bucket_start(timestamp_ms: u64, bucket_ms: u64) -> u64 {
    bucket_index(timestamp_ms, bucket_ms) * bucket_ms
}

pub fn time_label(timestamp_ms: u64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms as i64).single() {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
