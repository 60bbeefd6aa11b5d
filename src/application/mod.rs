//! Application layer: the overlay aggregate and the services that feed it.

pub mod config;
pub mod live_feed;
pub mod overlay;
pub mod runtime;
pub mod session;

pub use config::*;
pub use live_feed::*;
pub use overlay::*;
pub use session::*;
