pub use super::value_objects::Timestamp;
use serde::{Deserialize, Serialize};

/// Value Object - open/high/low/close prices of one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Ohlc {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { open, high, low, close }
    }

    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close].iter().all(|v| v.is_finite())
    }
}

/// Domain entity - Candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: Timestamp,
    pub ohlc: Ohlc,
}

impl Candle {
    pub fn new(time: Timestamp, ohlc: Ohlc) -> Self {
        Self { time, ohlc }
    }
}

/// Result of merging one streamed candle into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedUpdate {
    /// Same time as the last bar: the open bar was overwritten.
    Replaced,
    /// Newer than the last bar.
    Appended,
    /// Older than the last bar, or not finite. The buffer is unchanged.
    Rejected,
}

/// Domain entity - time-ascending candle buffer with unique times
#[derive(Debug, Clone, Default)]
pub struct CandleBuffer {
    candles: Vec<Candle>,
}

impl CandleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffer with a bulk history response.
    ///
    /// Input may be in any order. Candles with non-finite prices are dropped,
    /// duplicate times keep the later entry, and only the most recent `limit`
    /// bars are retained.
    pub fn replace_history(&mut self, mut candles: Vec<Candle>, limit: usize) {
        candles.retain(|candle| candle.ohlc.is_finite());
        // Stable sort keeps arrival order among equal times.
        candles.sort_by_key(|candle| candle.time);

        let mut unique: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match unique.last_mut() {
                Some(last) if last.time == candle.time => *last = candle,
                _ => unique.push(candle),
            }
        }

        if unique.len() > limit {
            unique.drain(..unique.len() - limit);
        }
        self.candles = unique;
    }

    /// Merge one streamed bar: overwrite the open bar or append a new one.
    /// An append beyond `limit` bars evicts the oldest.
    pub fn apply_update(&mut self, candle: Candle, limit: usize) -> FeedUpdate {
        if !candle.ohlc.is_finite() {
            return FeedUpdate::Rejected;
        }
        match self.candles.last_mut() {
            Some(last) if last.time == candle.time => {
                *last = candle;
                FeedUpdate::Replaced
            }
            Some(last) if candle.time < last.time => FeedUpdate::Rejected,
            _ => {
                self.candles.push(candle);
                if self.candles.len() > limit {
                    self.candles.drain(..self.candles.len() - limit);
                }
                FeedUpdate::Appended
            }
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// First and last loaded bar times.
    pub fn time_span(&self) -> Option<(Timestamp, Timestamp)> {
        Some((self.first()?.time, self.last()?.time))
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }
}
