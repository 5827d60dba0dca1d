pub mod gate;
pub mod poller;
pub mod session;

pub use gate::{FlightGuard, RefreshGate};
pub use poller::{FeedPoller, DEFAULT_POLL_INTERVAL};
pub use session::MarketSession;
