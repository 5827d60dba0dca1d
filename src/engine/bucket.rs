use rand::Rng;

use crate::model::candle::{bucket_index, Candle, BUCKET_MS};

pub const DEFAULT_WINDOW_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketTransition {
    /// `now` still falls in the last candle's bucket.
    SameBucket,
    /// `now` has left the last candle's bucket.
    NewBucket,
}

/// Extends a series by one step against wall-clock time.
#[derive(Debug, Clone)]
pub struct CandleBucketEngine {
    bucket_ms: u64,
    window_cap: usize,
}

impl Default for CandleBucketEngine {
    fn default() -> Self {
        Self::new(BUCKET_MS, DEFAULT_WINDOW_CAP)
    }
}

impl CandleBucketEngine {
    pub fn new(bucket_ms: u64, window_cap: usize) -> Self {
        assert!(bucket_ms > 0, "bucket_ms must be > 0");
        assert!(window_cap > 0, "window_cap must be > 0");
        Self {
            bucket_ms,
            window_cap,
        }
    }

    pub fn bucket_ms(&self) -> u64 {
        self.bucket_ms
    }

    pub fn classify(&self, last_timestamp_ms: u64, now_ms: u64) -> BucketTransition {
        if bucket_index(now_ms, self.bucket_ms) == bucket_index(last_timestamp_ms, self.bucket_ms) {
            BucketTransition::SameBucket
        } else {
            BucketTransition::NewBucket
        }
    }

    /// Returns the extended series and the transition taken. An empty input
    /// comes back empty with `None`.
    ///
    /// Only one bucket is ever added, however long ago the last candle was.
    /// A new bucket slides the window: the oldest candle goes, so the length
    /// stays that of `prior`, clamped to the window cap.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        prior: &[Candle],
        volatility: f64,
        now_ms: u64,
        rng: &mut R,
    ) -> (Vec<Candle>, Option<BucketTransition>) {
        let Some(last) = prior.last() else {
            return (Vec::new(), None);
        };

        let transition = self.classify(last.timestamp_ms, now_ms);
        let mut series = prior.to_vec();
        match transition {
            BucketTransition::SameBucket => {
                let drift = last.close * (rng.random::<f64>() - 0.5) * (volatility / 10.0);
                let close = last.close + drift;
                let extra_volume = rng.random_range(0..10u32) as f64;
                if let Some(tail) = series.last_mut() {
                    tail.close = close;
                    tail.high = tail.high.max(close);
                    tail.low = tail.low.min(close);
                    tail.volume += extra_volume;
                }
            }
            BucketTransition::NewBucket => {
                let next = Candle::flat(last.timestamp_ms + self.bucket_ms, last.close);
                series.remove(0);
                series.push(next);
                if series.len() > self.window_cap {
                    series.drain(..series.len() - self.window_cap);
                }
            }
        }
        (series, Some(transition))
    }
}
