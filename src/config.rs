use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::model::{Asset, AssetSpec};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    pub relay: RelayConfig,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub assets: Vec<AssetOverride>,
    pub signal: SignalConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub poll_interval: String,
    pub bucket_interval: String,
    pub window_cap: usize,
    pub cold_start_len: usize,
    pub default_asset: Asset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub attempt_timeout_ms: u64,
    #[serde(default = "crate::net::default_relay_templates")]
    pub templates: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    pub binance_base_url: String,
    pub kraken_base_url: String,
    pub mexc_base_url: String,
    pub yahoo_base_url: String,
    pub direct_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetOverride {
    pub id: Asset,
    pub seed_price: Option<f64>,
    pub volatility: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    #[serde(default = "default_signal_base_url")]
    pub base_url: String,
    #[serde(default = "default_signal_model")]
    pub model: String,
    #[serde(default = "default_signal_window")]
    pub window: usize,
    pub timeout_ms: u64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_signal_base_url() -> String {
    crate::signal::gemini::DEFAULT_BASE_URL.to_string()
}

fn default_signal_model() -> String {
    crate::signal::gemini::DEFAULT_MODEL.to_string()
}

fn default_signal_window() -> usize {
    crate::signal::DEFAULT_SIGNAL_WINDOW
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: String,
}

/// Parse an interval string (e.g. "1s", "5m", "1h", "1d", "1w", "1M") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    if s.len() < 2 {
        bail!("invalid interval '{}': expected format like '5m'", s);
    }

    let (num_str, suffix) = s.split_at(s.len() - 1);
    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_ms = match suffix {
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 7 * 86_400_000,
        "M" => 30 * 86_400_000,
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of s/m/h/d/w/M",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Result<Duration> {
        parse_interval_ms(&self.poll_interval).map(Duration::from_millis)
    }

    pub fn bucket_ms(&self) -> Result<u64> {
        parse_interval_ms(&self.bucket_interval)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = Path::new("config/default.toml");
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;

        let mut config =
            Self::from_toml_str(&config_str).context("failed to parse config/default.toml")?;
        config.signal.api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.feed
            .poll_interval()
            .context("feed.poll_interval is invalid")?;
        self.feed
            .bucket_ms()
            .context("feed.bucket_interval is invalid")?;
        if self.feed.window_cap == 0 {
            bail!("feed.window_cap must be > 0");
        }
        if self.feed.cold_start_len == 0 {
            bail!("feed.cold_start_len must be > 0");
        }
        if self.signal.window == 0 {
            bail!("signal.window must be > 0");
        }
        for o in &self.assets {
            if matches!(o.seed_price, Some(p) if !(p.is_finite() && p > 0.0)) {
                bail!("assets.{}: seed_price must be positive", o.id);
            }
            if matches!(o.volatility, Some(v) if !(v.is_finite() && v > 0.0 && v < 1.0)) {
                bail!("assets.{}: volatility must be in (0, 1)", o.id);
            }
        }
        Ok(())
    }

    /// Built-in asset parameters with configured overrides applied.
    pub fn asset_specs(&self) -> Vec<AssetSpec> {
        Asset::ALL
            .iter()
            .map(|asset| {
                let mut spec = asset.default_spec();
                for o in self.assets.iter().filter(|o| o.id == *asset) {
                    if let Some(p) = o.seed_price {
                        spec.seed_price = p;
                    }
                    if let Some(v) = o.volatility {
                        spec.volatility = v;
                    }
                }
                spec
            })
            .collect()
    }
}
