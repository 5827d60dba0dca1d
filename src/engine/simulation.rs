use rand::Rng;

use crate::model::candle::{bucket_start, Candle};
use crate::model::AssetSpec;

use super::bucket::{BucketTransition, CandleBucketEngine};

pub const DEFAULT_COLD_START_LEN: usize = 60;

/// Synthesizes a series when no provider answers.
#[derive(Debug, Clone)]
pub struct SimulationGenerator {
    engine: CandleBucketEngine,
}

impl SimulationGenerator {
    pub fn new(engine: CandleBucketEngine) -> Self {
        Self { engine }
    }

    /// Random walk from the seed price, `window` buckets ending at the bucket
    /// that contains `now_ms`.
    pub fn cold_start<R: Rng + ?Sized>(
        &self,
        spec: &AssetSpec,
        window: usize,
        now_ms: u64,
        rng: &mut R,
    ) -> Vec<Candle> {
        let bucket_ms = self.engine.bucket_ms();
        let aligned = bucket_start(now_ms, bucket_ms);
        let vol = spec.volatility;
        let mut price = spec.seed_price;
        let mut out = Vec::with_capacity(window);

        for i in (0..window as u64).rev() {
            let timestamp_ms = aligned.saturating_sub(i * bucket_ms);
            let open = price;
            let close = open + open * (rng.random::<f64>() - 0.5) * vol * 2.0;
            let high = open.max(close) + rng.random::<f64>() * open * vol * 0.5;
            let low = open.min(close) - rng.random::<f64>() * open * vol * 0.5;
            let volume = (rng.random::<f64>() * 1000.0).floor() + 100.0;
            out.push(Candle::new(timestamp_ms, open, high, low, close, volume));
            price = close;
        }
        out
    }

    /// One bucket-engine step over `prior`; an empty prior cold-starts.
    pub fn warm_continue<R: Rng + ?Sized>(
        &self,
        spec: &AssetSpec,
        prior: &[Candle],
        now_ms: u64,
        rng: &mut R,
    ) -> (Vec<Candle>, Option<BucketTransition>) {
        if prior.is_empty() {
            return (
                self.cold_start(spec, DEFAULT_COLD_START_LEN, now_ms, rng),
                None,
            );
        }
        self.engine.advance(prior, spec.volatility, now_ms, rng)
    }
}

impl Default for SimulationGenerator {
    fn default() -> Self {
        Self::new(CandleBucketEngine::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::candle::BUCKET_MS;
    use crate::model::Asset;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn cold_start_ends_at_aligned_now_and_chains_prices() {
        let gen = SimulationGenerator::default();
        let spec = Asset::Usoil.default_spec();
        let now = 1_700_000_123_456;
        let mut rng = StdRng::seed_from_u64(11);
        let out = gen.cold_start(&spec, 12, now, &mut rng);
        assert_eq!(out.len(), 12);
        assert_eq!(out.last().unwrap().timestamp_ms, bucket_start(now, BUCKET_MS));
        assert!((out[0].open - spec.seed_price).abs() < f64::EPSILON);
        for pair in out.windows(2) {
            assert!((pair[1].open - pair[0].close).abs() < f64::EPSILON);
        }
        for c in &out {
            assert!(c.volume >= 100.0 && c.volume < 1100.0);
            let bound = c.open * spec.volatility + 1e-9;
            assert!((c.close - c.open).abs() <= bound);
        }
    }

    #[test]
    fn warm_continue_on_empty_prior_cold_starts() {
        let gen = SimulationGenerator::default();
        let mut rng = StdRng::seed_from_u64(5);
        let (out, transition) =
            gen.warm_continue(&Asset::Btcusd.default_spec(), &[], 1_700_000_000_000, &mut rng);
        assert_eq!(out.len(), DEFAULT_COLD_START_LEN);
        assert!(transition.is_none());
    }
}
