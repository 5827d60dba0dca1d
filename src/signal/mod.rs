pub mod gemini;

use async_trait::async_trait;

use crate::model::{Asset, Candle, TradeSignal};

pub use gemini::GeminiSignalClient;

pub const DEFAULT_SIGNAL_WINDOW: usize = 20;

/// Boundary to the external trade-signal generator. Implementations must not
/// fail: any error becomes [`TradeSignal::unavailable`].
#[async_trait]
pub trait SignalService: Send + Sync {
    async fn generate(&self, asset: Asset, candles: &[Candle]) -> TradeSignal;
}

/// The newest `n` candles.
pub fn recent_window(candles: &[Candle], n: usize) -> &[Candle] {
    &candles[candles.len().saturating_sub(n)..]
}
