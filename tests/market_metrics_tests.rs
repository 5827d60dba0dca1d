use alpha_feed::market_metrics::{
    average_range_pct, classify_volatility, data_source_label, price_change, trend,
    TrendDirection, VolatilityLevel,
};
use alpha_feed::model::{Asset, Candle};

fn closes(values: &[f64]) -> Vec<Candle> {
    values
        .iter()
        .enumerate()
        .map(|(i, &c)| Candle::new(i as u64 * 300_000, c, c, c, c, 0.0))
        .collect()
}

#[test]
fn price_change_uses_previous_close() {
    let change = price_change(&closes(&[100.0, 102.0])).unwrap();
    assert!((change.change - 2.0).abs() < 1e-9);
    assert!((change.percent - 2.0).abs() < 1e-9);
    assert!(price_change(&[]).is_none());
}

#[test]
fn price_change_single_candle_uses_open() {
    let series = vec![Candle::new(0, 50.0, 56.0, 49.0, 55.0, 1.0)];
    let change = price_change(&series).unwrap();
    assert!((change.reference - 50.0).abs() < 1e-9);
    assert!((change.percent - 10.0).abs() < 1e-9);
}

#[test]
fn trend_detects_direction_and_saturates() {
    let up: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 0.1).collect();
    assert_eq!(trend(&closes(&up)), (TrendDirection::Bullish, 100));

    let down: Vec<f64> = (0..20).map(|i| 100.0 - i as f64 * 0.01).collect();
    let (direction, strength) = trend(&closes(&down));
    assert_eq!(direction, TrendDirection::Bearish);
    assert!(strength > 10 && strength < 100);

    assert_eq!(trend(&closes(&[1.0, 2.0, 3.0])), (TrendDirection::Neutral, 0));
}

#[test]
fn flat_series_is_neutral_and_low_volatility() {
    let flat = closes(&[100.0; 30]);
    assert_eq!(trend(&flat), (TrendDirection::Neutral, 0));
    assert_eq!(classify_volatility(average_range_pct(&flat)), VolatilityLevel::Low);
}

#[test]
fn volatility_thresholds() {
    assert_eq!(classify_volatility(None), VolatilityLevel::Low);
    assert_eq!(classify_volatility(Some(0.15)), VolatilityLevel::Low);
    assert_eq!(classify_volatility(Some(0.2)), VolatilityLevel::Medium);
    assert_eq!(classify_volatility(Some(0.36)), VolatilityLevel::High);

    let wide: Vec<Candle> = (0..10)
        .map(|i| Candle::new(i * 300_000, 100.0, 100.5, 99.5, 100.0, 0.0))
        .collect();
    let pct = average_range_pct(&wide).unwrap();
    assert!((pct - 1.0).abs() < 1e-9);
    assert_eq!(classify_volatility(Some(pct)), VolatilityLevel::High);
}

#[test]
fn source_label_reflects_liveness() {
    assert_eq!(data_source_label(Asset::Btcusd, true), "Binance Live Feed");
    assert_eq!(data_source_label(Asset::Xauusd, true), "Kraken Live Feed");
    assert_eq!(data_source_label(Asset::Usoil, true), "Mexc Live Feed");
    assert_eq!(data_source_label(Asset::Usoil, false), "Simulated (Offline)");
}
