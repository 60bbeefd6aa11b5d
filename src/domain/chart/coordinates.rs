use super::value_objects::{PixelPos, Point, Viewport};

/// Bidirectional mapping between canvas pixels and chart domain space.
///
/// Every conversion returns `None` instead of failing. Domain-to-pixel
/// conversions succeed for any finite input, including points that fall
/// off-canvas (the canvas clips them). Pixel-to-domain conversions only
/// succeed inside the visible plot area.
pub trait CoordinateBridge {
    fn time_to_x(&self, time: f64) -> Option<f64>;
    fn price_to_y(&self, price: f64) -> Option<f64>;
    fn x_to_time(&self, x: f64) -> Option<f64>;
    fn y_to_price(&self, y: f64) -> Option<f64>;

    /// Plot width in pixels.
    fn width(&self) -> f64;
    /// Plot height in pixels.
    fn height(&self) -> f64;

    fn to_pixel(&self, point: Point) -> Option<PixelPos> {
        Some(PixelPos::new(self.time_to_x(point.time)?, self.price_to_y(point.price)?))
    }

    fn to_point(&self, pos: PixelPos) -> Option<Point> {
        Some(Point::new(self.x_to_time(pos.x)?, self.y_to_price(pos.y)?))
    }
}

/// Bridge backed by the host chart's most recent viewport.
///
/// The host replaces the viewport on every pan, zoom, resize or data change;
/// `revision` counts replacements so consumers can tell a stale mapping apart.
#[derive(Debug, Clone, Default)]
pub struct ViewportBridge {
    viewport: Viewport,
    revision: u64,
}

impl ViewportBridge {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport, revision: 0 }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.revision += 1;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn finite(value: f64) -> Option<f64> {
        value.is_finite().then_some(value)
    }

    fn in_range(value: f64, extent: f64) -> bool {
        value.is_finite() && (0.0..=extent).contains(&value)
    }
}

impl CoordinateBridge for ViewportBridge {
    fn time_to_x(&self, time: f64) -> Option<f64> {
        if !self.viewport.is_valid() || !time.is_finite() {
            return None;
        }
        Self::finite(self.viewport.time_to_x(time))
    }

    fn price_to_y(&self, price: f64) -> Option<f64> {
        if !self.viewport.is_valid() || !price.is_finite() {
            return None;
        }
        Self::finite(self.viewport.price_to_y(price))
    }

    fn x_to_time(&self, x: f64) -> Option<f64> {
        if !self.viewport.is_valid() || !Self::in_range(x, self.viewport.width) {
            return None;
        }
        Self::finite(self.viewport.x_to_time(x))
    }

    fn y_to_price(&self, y: f64) -> Option<f64> {
        if !self.viewport.is_valid() || !Self::in_range(y, self.viewport.height) {
            return None;
        }
        Self::finite(self.viewport.y_to_price(y))
    }

    fn width(&self) -> f64 {
        self.viewport.width
    }

    fn height(&self) -> f64 {
        self.viewport.height
    }
}
