//! Domain layer: market data, chart geometry and the drawing model.
//! Nothing here touches the browser; every type runs natively in tests.

pub mod chart;
pub mod drawing;
pub mod errors;
pub mod logging;
pub mod market_data;
