use chrono::{DateTime, NaiveDateTime};
use derive_more::{Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Numeric times above this are milliseconds, not seconds.
///
/// A heuristic: 2e9 seconds is the year 2033, while any millisecond epoch
/// since 1970-01-24 is larger.
pub const MILLIS_THRESHOLD: f64 = 2_000_000_000.0;

/// Value Object - whole epoch seconds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Deref, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    /// Normalize a numeric epoch that may be seconds or milliseconds.
    pub fn from_numeric(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let secs = if value > MILLIS_THRESHOLD { value / 1000.0 } else { value };
        Some(Self(secs.floor() as i64))
    }

    /// Parse an ISO-8601 string, or a numeric string, into epoch seconds.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(number) = text.parse::<f64>() {
            return Self::from_numeric(number);
        }
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Some(Self(parsed.timestamp()));
        }
        // Offset-less timestamps are taken as UTC.
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|naive| Self(naive.and_utc().timestamp()))
    }
}

/// Wire form of a candle time: ISO string, whole seconds or milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    Numeric(f64),
    Text(String),
}

impl RawTime {
    pub fn normalize(&self) -> Option<Timestamp> {
        match self {
            RawTime::Numeric(value) => Timestamp::from_numeric(*value),
            RawTime::Text(text) => Timestamp::parse(text),
        }
    }
}

/// Value Object - trading symbol, stored upper-case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: &str) -> Result<Self, String> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return Err("Symbol cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.trim().to_uppercase())
    }
}

/// Value Object - candle timeframe as understood by the history endpoint
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    StrumDisplay,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
pub enum Timeframe {
    #[default]
    M5,
    M15,
    H1,
    H4,
    D1,
}
