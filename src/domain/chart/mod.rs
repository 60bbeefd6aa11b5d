//! Chart aggregate: viewport, pixel geometry and the coordinate bridge.

pub mod coordinates;
pub mod value_objects;

pub use coordinates::*;
pub use value_objects::*;
