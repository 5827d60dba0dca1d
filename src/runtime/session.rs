use crate::model::{Asset, Candle};

/// Caller-side state for the active asset. The series belongs to exactly one
/// asset and is thrown away on every switch.
#[derive(Debug, Clone)]
pub struct MarketSession {
    asset: Asset,
    series: Vec<Candle>,
    is_live: bool,
}

impl MarketSession {
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            series: Vec::new(),
            is_live: true,
        }
    }

    pub fn asset(&self) -> Asset {
        self.asset
    }

    pub fn series(&self) -> &[Candle] {
        &self.series
    }

    pub fn is_live(&self) -> bool {
        self.is_live
    }

    /// Returns true when the asset actually changed.
    pub fn switch_to(&mut self, asset: Asset) -> bool {
        if asset == self.asset {
            return false;
        }
        self.asset = asset;
        self.series.clear();
        self.is_live = true;
        true
    }

    /// Store a refresh result unless it was requested for an asset that is
    /// no longer active.
    pub fn apply(&mut self, asset: Asset, series: Vec<Candle>, is_live: bool) -> bool {
        if asset != self.asset {
            tracing::debug!(
                requested = %asset,
                active = %self.asset,
                "discarding stale refresh result"
            );
            return false;
        }
        self.series = series;
        self.is_live = is_live;
        true
    }
}
