use std::collections::HashMap;
use std::sync::Arc;

use crate::error::AppError;
use crate::model::{Asset, Candle};
use crate::provider::CandleSource;

/// One step of a chain: an adapter plus the instrument it is asked for.
#[derive(Clone)]
pub struct ChainLink {
    pub source: Arc<dyn CandleSource>,
    pub instrument: String,
}

impl ChainLink {
    pub fn new(source: Arc<dyn CandleSource>, instrument: &str) -> Self {
        Self {
            source,
            instrument: instrument.to_string(),
        }
    }
}

impl std::fmt::Debug for ChainLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source.name(), self.instrument)
    }
}

/// Fixed, ordered adapter chain per asset.
pub struct AssetSourceRouter {
    chains: HashMap<Asset, Vec<ChainLink>>,
}

impl AssetSourceRouter {
    /// Every asset must have a non-empty chain; a gap is a wiring bug and is
    /// reported here rather than at refresh time.
    pub fn new(chains: HashMap<Asset, Vec<ChainLink>>) -> Result<Self, AppError> {
        for asset in Asset::ALL {
            match chains.get(&asset) {
                Some(chain) if !chain.is_empty() => {}
                _ => return Err(AppError::MissingChain(asset.to_string())),
            }
        }
        Ok(Self { chains })
    }

    /// Standard wiring: spot crypto from the exchange; gold from the metal
    /// venue, then the gold-backed token, then the quote fallback; oil from the
    /// contract venue, then the quote fallback.
    pub fn standard(
        crypto: Arc<dyn CandleSource>,
        metal: Arc<dyn CandleSource>,
        energy: Arc<dyn CandleSource>,
        fallback: Arc<dyn CandleSource>,
    ) -> Result<Self, AppError> {
        let mut chains = HashMap::new();
        chains.insert(Asset::Btcusd, vec![ChainLink::new(crypto.clone(), "BTCUSDT")]);
        chains.insert(
            Asset::Xauusd,
            vec![
                ChainLink::new(metal, "XAUUSD"),
                ChainLink::new(crypto, "PAXGUSDT"),
                ChainLink::new(fallback.clone(), "GC=F"),
            ],
        );
        chains.insert(
            Asset::Usoil,
            vec![
                ChainLink::new(energy, "USOIL_USDT"),
                ChainLink::new(fallback, "CL=F"),
            ],
        );
        Self::new(chains)
    }

    pub fn chain(&self, asset: Asset) -> &[ChainLink] {
        self.chains.get(&asset).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First non-empty result wins; later links are not invoked and results
    /// are never merged. An all-empty chain yields an empty vector.
    pub async fn resolve(&self, asset: Asset) -> Vec<Candle> {
        for (idx, link) in self.chain(asset).iter().enumerate() {
            let candles = link.source.fetch(&link.instrument).await;
            if !candles.is_empty() {
                tracing::debug!(
                    asset = %asset,
                    link = idx,
                    source = link.source.name(),
                    instrument = %link.instrument,
                    count = candles.len(),
                    "chain resolved"
                );
                return candles;
            }
        }
        tracing::info!(asset = %asset, "no live data from any provider");
        Vec::new()
    }
}
