use crate::domain::drawing::{DEFAULT_HIT_TOLERANCE_PX, DEFAULT_STORAGE_KEY};
use crate::domain::errors::AppError;
use crate::domain::market_data::Timeframe;
use crate::infrastructure::rendering::OverlayStyle;
use serde::{Deserialize, Serialize};

/// Host-supplied settings. Every field has a default, so a host passes only
/// what it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub api_base_url: String,
    /// WebSocket URL with a `{symbol}` placeholder.
    pub stream_url_template: String,
    pub storage_key: String,
    pub history_limit: usize,
    pub hit_tolerance_px: f64,
    pub sync_interval_ms: u32,
    pub timeframe: Timeframe,
    /// URL parameter carrying an inline auth token.
    pub token_param: String,
    /// Storage key of a persisted auth token.
    pub token_storage_key: String,
    pub style: OverlayStyle,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            stream_url_template: "/ws/markets/{symbol}/candles".to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            history_limit: 1000,
            hit_tolerance_px: DEFAULT_HIT_TOLERANCE_PX,
            sync_interval_ms: 60_000,
            timeframe: Timeframe::M5,
            token_param: "token".to_string(),
            token_storage_key: "auth_token".to_string(),
            style: OverlayStyle::default(),
        }
    }
}

impl OverlayConfig {
    /// Overlay a partial JSON document on the defaults.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }
}
