use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::engine::{CandleBucketEngine, SimulationGenerator};
use crate::feed::MarketFeed;
use crate::net::{HttpTransport, ProxyRelay};
use crate::provider::{BinanceKlineSource, KrakenOhlcSource, MexcKlineSource, YahooChartSource};
use crate::router::AssetSourceRouter;
use crate::signal::GeminiSignalClient;

/// Wire relay, adapters, router and simulator from configuration. Any wiring
/// gap fails here, before the first refresh.
pub fn build_market_feed(config: &Config, transport: Arc<dyn HttpTransport>) -> Result<MarketFeed> {
    let relay = Arc::new(
        ProxyRelay::from_templates(
            transport.clone(),
            &config.relay.templates,
            Duration::from_millis(config.relay.attempt_timeout_ms),
        )
        .context("relay.templates is invalid")?,
    );
    let providers = &config.providers;
    let crypto = Arc::new(BinanceKlineSource::new(
        transport,
        &providers.binance_base_url,
        Duration::from_millis(providers.direct_timeout_ms),
    ));
    let metal = Arc::new(KrakenOhlcSource::new(relay.clone(), &providers.kraken_base_url));
    let energy = Arc::new(MexcKlineSource::new(relay.clone(), &providers.mexc_base_url));
    let fallback = Arc::new(YahooChartSource::new(relay, &providers.yahoo_base_url));

    let router = AssetSourceRouter::standard(crypto, metal, energy, fallback)
        .context("failed to build provider chains")?;
    let engine = CandleBucketEngine::new(
        config.feed.bucket_ms().context("feed.bucket_interval is invalid")?,
        config.feed.window_cap,
    );

    let mut feed = MarketFeed::new(router, SimulationGenerator::new(engine))
        .with_cold_start_len(config.feed.cold_start_len);
    for spec in config.asset_specs() {
        feed = feed.with_spec(spec);
    }
    tracing::info!(
        relays = config.relay.templates.len(),
        window_cap = config.feed.window_cap,
        "market feed ready"
    );
    Ok(feed)
}

pub fn build_signal_client(config: &Config) -> Result<GeminiSignalClient> {
    let signal = &config.signal;
    GeminiSignalClient::new(
        &signal.base_url,
        &signal.model,
        signal.api_key.clone(),
        signal.window,
        Duration::from_millis(signal.timeout_ms),
    )
    .context("failed to build signal client")
}
