pub mod relay;
pub mod transport;

pub use relay::{default_relay_templates, ProxyRelay, RelayTemplate};
pub use transport::{HttpTransport, ReqwestTransport};
