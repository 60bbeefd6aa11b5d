//! Live candle stream over a WebSocket and the candle wire format.

pub mod client;
pub mod dto;

pub use client::*;
pub use dto::*;
