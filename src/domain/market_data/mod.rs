//! Market data aggregate: candles, the live buffer and time normalization.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
