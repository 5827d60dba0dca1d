use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use alpha_feed::engine::SimulationGenerator;
use alpha_feed::feed::MarketFeed;
use alpha_feed::model::candle::{bucket_start, BUCKET_MS};
use alpha_feed::model::{Asset, AssetSpec, Candle};
use alpha_feed::provider::CandleSource;
use alpha_feed::router::{AssetSourceRouter, ChainLink};

const NOW_MS: u64 = 1_700_000_000_000;

struct ScriptedSource {
    name: &'static str,
    candles: Vec<Candle>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(name: &'static str, candles: Vec<Candle>) -> Arc<Self> {
        Arc::new(Self {
            name,
            candles,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandleSource for ScriptedSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _instrument: &str) -> Vec<Candle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.candles.clone()
    }
}

fn bars(n: usize, end_ms: u64, price: f64) -> Vec<Candle> {
    let end = bucket_start(end_ms, BUCKET_MS);
    (0..n as u64)
        .rev()
        .map(|i| Candle::new(end - i * BUCKET_MS, price, price + 1.0, price - 1.0, price + 0.5, 5.0))
        .collect()
}

/// Router where `asset` uses `chain` and every other asset has one empty link.
fn router_with(asset: Asset, chain: Vec<Arc<ScriptedSource>>) -> AssetSourceRouter {
    let idle = ScriptedSource::new("idle", Vec::new());
    let mut chains = HashMap::new();
    for a in Asset::ALL {
        chains.insert(a, vec![ChainLink::new(idle.clone(), "IDLE")]);
    }
    chains.insert(
        asset,
        chain
            .into_iter()
            .map(|s| ChainLink::new(s, asset.id()))
            .collect(),
    );
    AssetSourceRouter::new(chains).unwrap()
}

fn feed(router: AssetSourceRouter, seed: u64) -> MarketFeed {
    MarketFeed::with_rng(
        router,
        SimulationGenerator::default(),
        Box::new(StdRng::seed_from_u64(seed)),
    )
}

#[tokio::test]
/// The first non-empty link wins unmodified and later links never run.
async fn first_non_empty_link_short_circuits_chain() {
    let empty = ScriptedSource::new("empty", Vec::new());
    let winner = ScriptedSource::new("winner", bars(7, NOW_MS, 10.0));
    let never = ScriptedSource::new("never", bars(9, NOW_MS, 20.0));
    let feed = feed(
        router_with(Asset::Xauusd, vec![empty.clone(), winner.clone(), never.clone()]),
        1,
    );

    let out = feed.refresh_at(Asset::Xauusd, &[], NOW_MS).await;
    assert!(out.is_live);
    assert_eq!(out.series, bars(7, NOW_MS, 10.0));
    assert_eq!(empty.calls(), 1);
    assert_eq!(winner.calls(), 1);
    assert_eq!(never.calls(), 0);
}

#[tokio::test]
/// Live data replaces the prior series wholesale, with no merging.
async fn live_result_replaces_prior_series() {
    let live = ScriptedSource::new("live", bars(3, NOW_MS, 50.0));
    let feed = feed(router_with(Asset::Btcusd, vec![live]), 2);
    let prior = bars(40, NOW_MS - 10 * BUCKET_MS, 10.0);

    let out = feed.refresh_at(Asset::Btcusd, &prior, NOW_MS).await;
    assert!(out.is_live);
    assert_eq!(out.series.len(), 3);
    assert_eq!(out.series[0].open, 50.0);
}

#[tokio::test]
/// Cold start: 60 bars, exact bucket spacing, ending at the current bucket.
async fn all_empty_without_prior_cold_starts_sixty_bars() {
    let feed = feed(
        router_with(Asset::Usoil, vec![ScriptedSource::new("a", Vec::new())]),
        3,
    );
    let out = feed.refresh_at(Asset::Usoil, &[], NOW_MS).await;
    assert!(!out.is_live);
    assert_eq!(out.series.len(), 60);
    for pair in out.series.windows(2) {
        assert_eq!(pair[1].timestamp_ms - pair[0].timestamp_ms, BUCKET_MS);
    }
    assert_eq!(
        out.series.last().unwrap().timestamp_ms,
        bucket_start(NOW_MS, BUCKET_MS)
    );
    assert!(out.series.iter().all(Candle::is_well_formed));
}

#[tokio::test]
/// Warm continuation of a cap-sized prior keeps the length whichever
/// bucket transition is taken.
async fn all_empty_with_prior_keeps_length() {
    let feed = feed(
        router_with(Asset::Btcusd, vec![ScriptedSource::new("a", Vec::new())]),
        4,
    );
    let prior = bars(100, NOW_MS - BUCKET_MS, 100.0);

    let next_bucket = feed.refresh_at(Asset::Btcusd, &prior, NOW_MS).await;
    assert!(!next_bucket.is_live);
    assert_eq!(next_bucket.series.len(), 100);

    let same_bucket = feed
        .refresh_at(Asset::Btcusd, &prior, prior.last().unwrap().timestamp_ms + 1)
        .await;
    assert!(!same_bucket.is_live);
    assert_eq!(same_bucket.series.len(), 100);
}

#[tokio::test]
/// An offline cold start carried across a bucket boundary keeps its 60 bars,
/// and a short live-sourced prior keeps its own length too.
async fn warm_path_keeps_prior_length_below_cap() {
    let feed = feed(
        router_with(Asset::Usoil, vec![ScriptedSource::new("a", Vec::new())]),
        13,
    );
    let aligned = bucket_start(NOW_MS, BUCKET_MS);
    let cold = feed.refresh_at(Asset::Usoil, &[], NOW_MS).await;
    assert_eq!(cold.series.len(), 60);

    let warm = feed
        .refresh_at(Asset::Usoil, &cold.series, aligned + BUCKET_MS)
        .await;
    assert!(!warm.is_live);
    assert_eq!(warm.series.len(), 60);
    assert_eq!(warm.series[0], cold.series[1]);
    assert_eq!(warm.series.last().unwrap().timestamp_ms, aligned + BUCKET_MS);

    let short = bars(8, NOW_MS, 68.0);
    let next = feed
        .refresh_at(Asset::Usoil, &short, aligned + BUCKET_MS)
        .await;
    assert_eq!(next.series.len(), 8);
}

#[tokio::test]
/// Crypto with no prior: 100 bars straight from the primary source.
async fn crypto_primary_serves_hundred_bars() {
    let primary = ScriptedSource::new("binance", bars(100, NOW_MS, 91_000.0));
    let feed = feed(router_with(Asset::Btcusd, vec![primary]), 5);

    let out = feed.refresh_at(Asset::Btcusd, &[], NOW_MS).await;
    assert!(out.is_live);
    assert_eq!(out.series.len(), 100);
    assert!(out.series.last().unwrap().timestamp_ms <= NOW_MS);
}

#[tokio::test]
/// A prior whose last bucket started 4 minutes ago is mutated in
/// place, with the close drifting at most close * vol / 20.
async fn same_bucket_mutates_last_candle_of_prior() {
    let feed = feed(
        router_with(Asset::Btcusd, vec![ScriptedSource::new("a", Vec::new())]),
        6,
    );
    let last_bucket = bucket_start(NOW_MS, BUCKET_MS);
    let prior = bars(30, last_bucket, 91_000.0);
    let now = last_bucket + 4 * 60 * 1000;

    let out = feed.refresh_at(Asset::Btcusd, &prior, now).await;
    assert!(!out.is_live);
    assert_eq!(out.series.len(), prior.len());

    let before = prior.last().unwrap();
    let after = out.series.last().unwrap();
    let vol = Asset::Btcusd.default_spec().volatility;
    assert_eq!(after.timestamp_ms, before.timestamp_ms);
    assert_eq!(after.open, before.open);
    assert!((after.close - before.close).abs() <= before.close * vol / 20.0 + 1e-9);
    assert!(after.high >= before.high);
    assert!(after.low <= before.low);
    assert_eq!(&out.series[..29], &prior[..29]);
}

#[tokio::test]
/// Identical seeds give identical cold starts.
async fn cold_start_is_reproducible_with_fixed_seed() {
    let make = || {
        feed(
            router_with(Asset::Xauusd, vec![ScriptedSource::new("a", Vec::new())]),
            99,
        )
    };
    let a = make().refresh_at(Asset::Xauusd, &[], NOW_MS).await;
    let b = make().refresh_at(Asset::Xauusd, &[], NOW_MS).await;
    assert_eq!(a.series, b.series);

    let c = feed(
        router_with(Asset::Xauusd, vec![ScriptedSource::new("a", Vec::new())]),
        100,
    )
    .refresh_at(Asset::Xauusd, &[], NOW_MS)
    .await;
    assert_ne!(a.series, c.series);
}

#[test]
/// A missing chain is a wiring error reported at construction.
fn router_rejects_missing_or_empty_chain() {
    let src = ScriptedSource::new("a", Vec::new());
    let mut chains = HashMap::new();
    chains.insert(Asset::Btcusd, vec![ChainLink::new(src.clone(), "BTCUSDT")]);
    chains.insert(Asset::Xauusd, vec![ChainLink::new(src, "XAUUSD")]);
    assert!(AssetSourceRouter::new(chains.clone()).is_err());

    chains.insert(Asset::Usoil, Vec::new());
    assert!(AssetSourceRouter::new(chains).is_err());
}

#[test]
fn standard_router_wires_documented_chains() {
    let crypto = ScriptedSource::new("crypto", Vec::new());
    let metal = ScriptedSource::new("metal", Vec::new());
    let energy = ScriptedSource::new("energy", Vec::new());
    let fallback = ScriptedSource::new("fallback", Vec::new());
    let router = AssetSourceRouter::standard(crypto, metal, energy, fallback).unwrap();

    let describe = |asset| {
        router
            .chain(asset)
            .iter()
            .map(|l| format!("{}:{}", l.source.name(), l.instrument))
            .collect::<Vec<_>>()
    };
    assert_eq!(describe(Asset::Btcusd), vec!["crypto:BTCUSDT"]);
    assert_eq!(
        describe(Asset::Xauusd),
        vec!["metal:XAUUSD", "crypto:PAXGUSDT", "fallback:GC=F"]
    );
    assert_eq!(describe(Asset::Usoil), vec!["energy:USOIL_USDT", "fallback:CL=F"]);
}

#[test]
/// Configured cold-start length and seed price drive the offline series.
fn configured_spec_and_length_shape_cold_start() {
    let feed = feed(
        router_with(Asset::Usoil, vec![ScriptedSource::new("a", Vec::new())]),
        12,
    )
    .with_cold_start_len(24)
    .with_spec(AssetSpec::new(Asset::Usoil, "US Oil", 70.0, 0.0015));

    let out = tokio_test::block_on(feed.refresh_at(Asset::Usoil, &[], NOW_MS));
    assert!(!out.is_live);
    assert_eq!(out.series.len(), 24);
    assert_eq!(out.series[0].open, 70.0);
    assert_eq!(feed.spec(Asset::Usoil).seed_price, 70.0);
}
