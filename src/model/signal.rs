use serde::{Deserialize, Serialize};

pub const UNAVAILABLE_REASONING: &str = "Analysis service temporarily unavailable.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSignal {
    pub signal_type: SignalType,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// 0..=100
    pub confidence: f64,
    pub reasoning: String,
    pub risk_reward_ratio: String,
    pub timestamp_ms: u64,
}

impl TradeSignal {
    /// Substitute used whenever the signal service cannot answer.
    pub fn unavailable(timestamp_ms: u64) -> Self {
        Self {
            signal_type: SignalType::Hold,
            entry_price: 0.0,
            stop_loss: 0.0,
            take_profit: 0.0,
            confidence: 0.0,
            reasoning: UNAVAILABLE_REASONING.to_string(),
            risk_reward_ratio: "N/A".to_string(),
            timestamp_ms,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.signal_type != SignalType::Hold
    }
}
