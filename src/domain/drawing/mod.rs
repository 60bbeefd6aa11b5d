//! Drawing aggregate: shapes, persistence, hit-testing, gestures and the
//! server annotation layer.

pub mod engine;
pub mod interaction;
pub mod persistence;
pub mod shapes;
pub mod store;

pub use crate::domain::chart::Point;
pub use engine::*;
pub use hit_test::*;
pub use interaction::*;
pub use persistence::*;
pub use shapes::*;
pub use store::*;
