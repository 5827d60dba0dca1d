use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::model::Asset;

/// Per-asset single-flight: at most one refresh cycle per asset at a time.
/// Assets never block one another.
#[derive(Clone, Default)]
pub struct RefreshGate {
    in_flight: Arc<Mutex<HashSet<Asset>>>,
}

/// Holds the asset's slot until dropped.
pub struct FlightGuard {
    asset: Asset,
    in_flight: Arc<Mutex<HashSet<Asset>>>,
}

impl RefreshGate {
    pub fn try_begin(&self, asset: Asset) -> Option<FlightGuard> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(asset) {
            return None;
        }
        Some(FlightGuard {
            asset,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self, asset: Asset) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&asset)
    }
}

impl FlightGuard {
    pub fn asset(&self) -> Asset {
        self.asset
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.asset);
    }
}
