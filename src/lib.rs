pub mod bootstrap;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod feed;
pub mod input;
pub mod market_metrics;
pub mod model;
pub mod net;
pub mod provider;
pub mod router;
pub mod runtime;
pub mod signal;
