use crate::model::{Asset, Candle, TradeSignal};

#[derive(Debug, Clone)]
pub enum FeedEvent {
    SeriesUpdated {
        asset: Asset,
        candles: Vec<Candle>,
        is_live: bool,
    },
    AssetSwitched(Asset),
    /// A refresh finished after its asset had been switched away.
    StaleDiscarded(Asset),
    SignalReady {
        asset: Asset,
        signal: TradeSignal,
    },
    LogMessage(String),
}
