use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Asset {
    #[serde(rename = "BTCUSD")]
    Btcusd,
    #[serde(rename = "XAUUSD")]
    Xauusd,
    #[serde(rename = "USOIL")]
    Usoil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Crypto,
    Metal,
    Energy,
}

impl Asset {
    pub const ALL: [Asset; 3] = [Asset::Btcusd, Asset::Xauusd, Asset::Usoil];

    pub fn id(self) -> &'static str {
        match self {
            Asset::Btcusd => "BTCUSD",
            Asset::Xauusd => "XAUUSD",
            Asset::Usoil => "USOIL",
        }
    }

    pub fn class(self) -> AssetClass {
        match self {
            Asset::Btcusd => AssetClass::Crypto,
            Asset::Xauusd => AssetClass::Metal,
            Asset::Usoil => AssetClass::Energy,
        }
    }

    /// Built-in simulation parameters for the asset.
    pub fn default_spec(self) -> AssetSpec {
        match self {
            Asset::Btcusd => AssetSpec::new(self, "Bitcoin", 91_000.0, 0.002),
            Asset::Xauusd => AssetSpec::new(self, "Gold", 2_715.0, 0.0008),
            Asset::Usoil => AssetSpec::new(self, "US Oil", 68.50, 0.0015),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Asset {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase();
        match key.as_str() {
            "BTCUSD" | "BTC" => Ok(Asset::Btcusd),
            "XAUUSD" | "XAU" | "GOLD" => Ok(Asset::Xauusd),
            "USOIL" | "OIL" | "WTI" => Ok(Asset::Usoil),
            _ => Err(AppError::Config(format!("unknown asset '{}'", s.trim()))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetSpec {
    pub asset: Asset,
    pub name: String,
    pub seed_price: f64,
    /// Fractional dispersion per bucket (0.002 = 0.2%).
    pub volatility: f64,
}

impl AssetSpec {
    pub fn new(asset: Asset, name: &str, seed_price: f64, volatility: f64) -> Self {
        Self {
            asset,
            name: name.to_string(),
            seed_price,
            volatility,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_and_aliases_case_insensitively() {
        assert_eq!("btcusd".parse::<Asset>().unwrap(), Asset::Btcusd);
        assert_eq!(" Gold ".parse::<Asset>().unwrap(), Asset::Xauusd);
        assert_eq!("oil".parse::<Asset>().unwrap(), Asset::Usoil);
        assert!("EURUSD".parse::<Asset>().is_err());
    }

    #[test]
    fn default_specs_match_asset() {
        for asset in Asset::ALL {
            let spec = asset.default_spec();
            assert_eq!(spec.asset, asset);
            assert!(spec.seed_price > 0.0);
            assert!(spec.volatility > 0.0 && spec.volatility < 0.01);
        }
        assert_eq!(Asset::Xauusd.class(), AssetClass::Metal);
        assert_eq!(Asset::Usoil.to_string(), "USOIL");
    }
}
