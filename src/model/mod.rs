pub mod asset;
pub mod candle;
pub mod signal;

pub use asset::{Asset, AssetClass, AssetSpec};
pub use candle::Candle;
pub use signal::{SignalType, TradeSignal};
