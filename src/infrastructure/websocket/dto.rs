use crate::domain::errors::AppError;
use crate::domain::market_data::{Candle, Ohlc, RawTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire form of one candle, shared by the history endpoint and the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleDto {
    pub time: RawTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl CandleDto {
    /// Convert to a domain candle, normalizing the time unit.
    pub fn to_domain_candle(&self) -> Result<Candle, AppError> {
        let time = self
            .time
            .normalize()
            .ok_or_else(|| AppError::Parse(format!("unusable candle time {:?}", self.time)))?;
        let ohlc = Ohlc::new(self.open, self.high, self.low, self.close);
        if !ohlc.is_finite() {
            return Err(AppError::Validation("non-finite candle prices".to_string()));
        }
        Ok(Candle::new(time, ohlc))
    }
}

impl From<&Candle> for CandleDto {
    fn from(candle: &Candle) -> Self {
        Self {
            time: RawTime::Numeric(candle.time.as_f64()),
            open: candle.ohlc.open,
            high: candle.ohlc.high,
            low: candle.ohlc.low,
            close: candle.ohlc.close,
        }
    }
}

/// Parse one live-stream message: a single JSON candle object.
pub fn parse_candle_message(text: &str) -> Result<Candle, AppError> {
    let dto: CandleDto = serde_json::from_str(text)?;
    dto.to_domain_candle()
}

/// Parse a history response: a bare array, or `{candles: [...]}`.
///
/// Unusable entries are dropped; the caller sorts and deduplicates.
pub fn parse_history_response(document: &Value) -> Result<Vec<Candle>, AppError> {
    let entries = document
        .as_array()
        .or_else(|| document.get("candles").and_then(Value::as_array))
        .ok_or_else(|| AppError::Parse("history response carries no candle array".to_string()))?;
    Ok(entries
        .iter()
        .filter_map(|entry| CandleDto::deserialize(entry).ok())
        .filter_map(|dto| dto.to_domain_candle().ok())
        .collect())
}
