use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::model::candle::now_ms;
use crate::model::{Asset, Candle, SignalType, TradeSignal};

use super::{recent_window, SignalService};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Signal generation through the Gemini `generateContent` endpoint.
pub struct GeminiSignalClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    window: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSignal {
    #[serde(rename = "type")]
    signal_type: SignalType,
    #[serde(default)]
    entry_price: Option<f64>,
    #[serde(default)]
    stop_loss: Option<f64>,
    #[serde(default)]
    take_profit: Option<f64>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    risk_reward_ratio: Option<String>,
}

impl GeminiSignalClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        window: usize,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            window: window.max(1),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn try_generate(&self, asset: Asset, candles: &[Candle]) -> Result<TradeSignal, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("GEMINI_API_KEY not set".to_string()))?;
        let recent = recent_window(candles, self.window);
        if recent.is_empty() {
            return Err(AppError::parse("no candles to analyze"));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(asset, recent) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }
        });

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }
        let text = resp.text().await?;
        parse_generate_response(&text, now_ms())
    }
}

#[async_trait]
impl SignalService for GeminiSignalClient {
    async fn generate(&self, asset: Asset, candles: &[Candle]) -> TradeSignal {
        match self.try_generate(asset, candles).await {
            Ok(signal) => {
                tracing::info!(
                    asset = %asset,
                    signal = %signal.signal_type,
                    confidence = signal.confidence,
                    "signal generated"
                );
                signal
            }
            Err(e) => {
                tracing::warn!(asset = %asset, error = %e, "signal generation failed, holding");
                TradeSignal::unavailable(now_ms())
            }
        }
    }
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "type": { "type": "STRING", "enum": ["BUY", "SELL", "HOLD"] },
            "entryPrice": { "type": "NUMBER" },
            "stopLoss": { "type": "NUMBER" },
            "takeProfit": { "type": "NUMBER" },
            "confidence": { "type": "NUMBER" },
            "reasoning": { "type": "STRING" },
            "riskRewardRatio": { "type": "STRING" }
        },
        "required": [
            "type", "entryPrice", "stopLoss", "takeProfit",
            "confidence", "reasoning", "riskRewardRatio"
        ]
    })
}

pub fn build_prompt(asset: Asset, recent: &[Candle]) -> String {
    let current_price = recent.last().map(|c| c.close).unwrap_or(0.0);
    let rows: Vec<Value> = recent
        .iter()
        .map(|c| {
            json!({
                "t": c.time, "o": c.open, "h": c.high,
                "l": c.low, "c": c.close, "v": c.volume
            })
        })
        .collect();
    format!(
        "Analyze the following OHLC market data for {asset} on a 5-minute timeframe.\n\
         Data (JSON):\n{data}\n\
         Tasks:\n\
         1. Identify the immediate trend and key support/resistance levels.\n\
         2. Generate a trading signal: BUY, SELL, or HOLD.\n\
         3. For BUY or SELL use entry price {price} (current market price), place the stop loss \
         beyond support (buy) or resistance (sell), and set take profit for a 1:2 risk:reward; \
         riskRewardRatio must be \"1:2\".\n\
         4. Give brief technical reasoning (max 2 sentences).\n\
         5. Confidence 0-100. If the setup is unclear, answer HOLD with 0 entry/sl/tp.\n\
         Return JSON strictly matching the schema.",
        asset = asset,
        data = Value::Array(rows),
        price = current_price,
    )
}

/// Extract the model's JSON answer from a `generateContent` response.
pub fn parse_generate_response(body: &str, timestamp_ms: u64) -> Result<TradeSignal, AppError> {
    let root: Value = serde_json::from_str(body)?;
    let text = root
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::parse("generateContent response has no text part"))?;
    let raw: RawSignal = serde_json::from_str(text)?;

    let non_empty = |s: Option<String>, default: &str| {
        s.filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };
    Ok(TradeSignal {
        signal_type: raw.signal_type,
        entry_price: raw.entry_price.unwrap_or(0.0),
        stop_loss: raw.stop_loss.unwrap_or(0.0),
        take_profit: raw.take_profit.unwrap_or(0.0),
        confidence: raw.confidence.unwrap_or(0.0).clamp(0.0, 100.0),
        reasoning: non_empty(raw.reasoning, "Market uncertain."),
        risk_reward_ratio: non_empty(raw.risk_reward_ratio, "N/A"),
        timestamp_ms,
    })
}
