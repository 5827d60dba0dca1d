use crate::model::{Asset, AssetClass, Candle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub current: f64,
    pub reference: f64,
    pub change: f64,
    pub percent: f64,
}

/// Change of the last close against the previous close, or against the
/// last open when the series holds a single candle.
pub fn price_change(series: &[Candle]) -> Option<PriceChange> {
    let current = series.last()?;
    let reference = match series.len() {
        1 => current.open,
        n => series[n - 2].close,
    };
    let change = current.close - reference;
    let percent = if reference != 0.0 {
        change / reference * 100.0
    } else {
        0.0
    };
    Some(PriceChange {
        current: current.close,
        reference,
        change,
        percent,
    })
}

/// Direction and 0..=100 strength over the last 20 closes. A 1.25% move
/// saturates the strength.
pub fn trend(series: &[Candle]) -> (TrendDirection, u8) {
    if series.len() < 5 {
        return (TrendDirection::Neutral, 0);
    }
    let period = series.len().min(20);
    let start = series[series.len() - period].close;
    let end = series[series.len() - 1].close;
    if start == 0.0 {
        return (TrendDirection::Neutral, 0);
    }
    let change_pct = (end - start) / start * 100.0;
    let strength = (change_pct.abs() * 80.0).round().min(100.0) as u8;
    let direction = if strength <= 10 {
        TrendDirection::Neutral
    } else if change_pct > 0.0 {
        TrendDirection::Bullish
    } else {
        TrendDirection::Bearish
    };
    (direction, strength)
}

/// Mean high-low range over the last 10 candles, as a percent of open.
pub fn average_range_pct(series: &[Candle]) -> Option<f64> {
    if series.len() < 5 {
        return None;
    }
    let subset = &series[series.len().saturating_sub(10)..];
    let sum: f64 = subset
        .iter()
        .filter(|c| c.open != 0.0)
        .map(|c| (c.high - c.low) / c.open)
        .sum();
    Some(sum / subset.len() as f64 * 100.0)
}

pub fn classify_volatility(avg_range_pct: Option<f64>) -> VolatilityLevel {
    match avg_range_pct {
        Some(p) if p > 0.35 => VolatilityLevel::High,
        Some(p) if p > 0.15 => VolatilityLevel::Medium,
        _ => VolatilityLevel::Low,
    }
}

pub fn data_source_label(asset: Asset, is_live: bool) -> &'static str {
    if !is_live {
        return "Simulated (Offline)";
    }
    match asset.class() {
        AssetClass::Crypto => "Binance Live Feed",
        AssetClass::Metal => "Kraken Live Feed",
        AssetClass::Energy => "Mexc Live Feed",
    }
}
