//! Overlay compositing: the surface abstraction, the compositor and the
//! Canvas 2D backend.

pub mod canvas_renderer;
pub mod overlay_renderer;
pub mod style;

pub use canvas_renderer::Canvas2dSurface;
pub use overlay_renderer::*;
pub use style::OverlayStyle;
