use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::event::FeedEvent;
use crate::feed::MarketFeed;
use crate::model::Asset;

use super::gate::RefreshGate;
use super::session::MarketSession;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, PartialEq, Eq)]
enum CycleEnd {
    Done,
    /// The active asset changed while the cycle was in flight.
    Switched,
    Closed,
}

/// Drives refresh cycles for the active asset: once on start, once right
/// after every switch, then on a fixed interval. Cycles never overlap.
pub struct FeedPoller {
    feed: Arc<MarketFeed>,
    gate: RefreshGate,
    interval: Duration,
}

impl FeedPoller {
    pub fn new(feed: Arc<MarketFeed>, gate: RefreshGate, interval: Duration) -> Self {
        Self {
            feed,
            gate,
            interval,
        }
    }

    pub async fn run(
        self,
        mut asset_rx: watch::Receiver<Asset>,
        mut shutdown_rx: watch::Receiver<bool>,
        tx: mpsc::Sender<FeedEvent>,
    ) {
        let mut session = MarketSession::new(*asset_rx.borrow_and_update());
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
        tracing::info!(asset = %session.asset(), interval_ms, "poller started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = asset_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let next = *asset_rx.borrow_and_update();
                    if session.switch_to(next) {
                        tracing::info!(asset = %next, "active asset switched");
                        if tx.send(FeedEvent::AssetSwitched(next)).await.is_err() {
                            break;
                        }
                    }
                    ticker.reset();
                }
                res = shutdown_rx.changed() => {
                    if res.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }
            }

            loop {
                match self.run_cycle(&mut session, &mut asset_rx, &tx).await {
                    CycleEnd::Done => break,
                    CycleEnd::Switched => {
                        ticker.reset();
                        continue;
                    }
                    CycleEnd::Closed => {
                        tracing::info!("feed event channel closed, poller exiting");
                        return;
                    }
                }
            }
        }
        tracing::info!("poller shutting down");
    }

    async fn run_cycle(
        &self,
        session: &mut MarketSession,
        asset_rx: &mut watch::Receiver<Asset>,
        tx: &mpsc::Sender<FeedEvent>,
    ) -> CycleEnd {
        let asset = session.asset();
        let Some(_guard) = self.gate.try_begin(asset) else {
            tracing::debug!(asset = %asset, "refresh already in flight, skipping tick");
            return CycleEnd::Done;
        };

        let outcome = self.feed.refresh(asset, session.series()).await;

        let active = *asset_rx.borrow_and_update();
        let switched = session.switch_to(active);
        if switched {
            tracing::info!(asset = %active, "active asset switched");
            if tx.send(FeedEvent::AssetSwitched(active)).await.is_err() {
                return CycleEnd::Closed;
            }
        }

        let event = if session.apply(asset, outcome.series.clone(), outcome.is_live) {
            FeedEvent::SeriesUpdated {
                asset,
                candles: outcome.series,
                is_live: outcome.is_live,
            }
        } else {
            FeedEvent::StaleDiscarded(asset)
        };
        if tx.send(event).await.is_err() {
            return CycleEnd::Closed;
        }

        if switched {
            CycleEnd::Switched
        } else {
            CycleEnd::Done
        }
    }
}
