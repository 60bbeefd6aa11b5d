//! JavaScript-facing surface of the crate.

pub mod wasm_api;

pub use wasm_api::ChartOverlayApi;
