use std::collections::HashMap;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::engine::{SimulationGenerator, DEFAULT_COLD_START_LEN};
use crate::model::candle::now_ms;
use crate::model::{Asset, AssetSpec, Candle};
use crate::router::AssetSourceRouter;

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    pub series: Vec<Candle>,
    /// True only when the whole series came from a provider this cycle.
    pub is_live: bool,
}

/// Public entry point of the market-data core. Holds no series state: each
/// call gets the prior series and returns the next one.
pub struct MarketFeed {
    router: AssetSourceRouter,
    simulator: SimulationGenerator,
    specs: HashMap<Asset, AssetSpec>,
    cold_start_len: usize,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl MarketFeed {
    /// Production feed with an OS-seeded randomness source.
    pub fn new(router: AssetSourceRouter, simulator: SimulationGenerator) -> Self {
        Self::with_rng(router, simulator, Box::new(StdRng::from_os_rng()))
    }

    pub fn with_rng(
        router: AssetSourceRouter,
        simulator: SimulationGenerator,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let specs = Asset::ALL
            .iter()
            .map(|a| (*a, a.default_spec()))
            .collect();
        Self {
            router,
            simulator,
            specs,
            cold_start_len: DEFAULT_COLD_START_LEN,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_cold_start_len(mut self, len: usize) -> Self {
        self.cold_start_len = len.max(1);
        self
    }

    /// Replace the simulation parameters of one asset.
    pub fn with_spec(mut self, spec: AssetSpec) -> Self {
        self.specs.insert(spec.asset, spec);
        self
    }

    pub fn spec(&self, asset: Asset) -> AssetSpec {
        self.specs
            .get(&asset)
            .cloned()
            .unwrap_or_else(|| asset.default_spec())
    }

    pub fn router(&self) -> &AssetSourceRouter {
        &self.router
    }

    pub async fn refresh(&self, asset: Asset, prior: &[Candle]) -> RefreshOutcome {
        self.refresh_at(asset, prior, now_ms()).await
    }

    /// Live data replaces `prior` wholesale. Otherwise the prior series is
    /// continued, or a fresh one is cold-started when there is none.
    pub async fn refresh_at(&self, asset: Asset, prior: &[Candle], now_ms: u64) -> RefreshOutcome {
        let live = self.router.resolve(asset).await;
        if !live.is_empty() {
            tracing::debug!(asset = %asset, count = live.len(), "refresh served live");
            return RefreshOutcome {
                series: live,
                is_live: true,
            };
        }

        let spec = self.spec(asset);
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let series = if prior.is_empty() {
            tracing::debug!(asset = %asset, len = self.cold_start_len, "refresh cold-started simulation");
            self.simulator
                .cold_start(&spec, self.cold_start_len, now_ms, rng.as_mut())
        } else {
            let (series, transition) =
                self.simulator
                    .warm_continue(&spec, prior, now_ms, rng.as_mut());
            tracing::debug!(asset = %asset, ?transition, len = series.len(), "refresh continued simulation");
            series
        };
        RefreshOutcome {
            series,
            is_live: false,
        }
    }
}
