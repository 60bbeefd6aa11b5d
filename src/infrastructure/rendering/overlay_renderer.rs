use super::style::OverlayStyle;
use crate::domain::chart::{Color, CoordinateBridge, PixelPos, PixelRect};
use crate::domain::drawing::{EngineShape, Projected, Shape, ShapeId};
use crate::domain::errors::RenderingResult;

/// Smallest extent a shape is drawn with, so degenerate shapes stay visible.
pub const MIN_EXTENT_PX: f64 = 1.0;

/// Drawing primitives the compositor needs from a 2D surface.
pub trait OverlaySurface {
    fn clear(&mut self, width: f64, height: f64);
    fn set_stroke(&mut self, color: Color, width: f64);
    fn set_fill(&mut self, color: Color);
    fn set_dash(&mut self, pattern: &[f64]) -> RenderingResult<()>;
    fn stroke_line(&mut self, from: PixelPos, to: PixelPos);
    fn fill_rect(&mut self, rect: PixelRect);
    fn stroke_rect(&mut self, rect: PixelRect);
    /// Draw `text` with its bottom-left corner at `at`.
    fn fill_text(&mut self, text: &str, at: PixelPos, font: &str) -> RenderingResult<()>;
}

/// Everything one frame shows.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayFrame<'a> {
    pub engine: &'a [EngineShape],
    pub user: &'a [Shape],
    pub draft: Option<&'a Shape>,
    pub selected: Option<&'a ShapeId>,
}

struct Paint {
    stroke: Color,
    fill: Color,
    width: f64,
}

/// Compositor: a pure function of the frame, the bridge and the style.
///
/// Back to front: engine shapes, user shapes, then the dashed draft.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Clear the surface and draw the frame. Returns how many shapes were
    /// drawn; shapes without a pixel mapping are skipped.
    pub fn render(
        &self,
        frame: &OverlayFrame<'_>,
        bridge: &dyn CoordinateBridge,
        surface: &mut dyn OverlaySurface,
    ) -> RenderingResult<usize> {
        let style = &self.style;
        surface.clear(bridge.width(), bridge.height());
        surface.set_dash(&[])?;
        let mut drawn = 0;

        for engine in frame.engine {
            let base = style.tone_color(engine.tone);
            let paint = Paint { stroke: base, fill: base.with_alpha(style.engine_fill_alpha), width: style.line_width };
            drawn += usize::from(self.draw_shape(&engine.shape, &paint, bridge, surface)?);
        }

        for shape in frame.user {
            let paint = if frame.selected == Some(&shape.id) {
                Paint {
                    stroke: style.highlight_color,
                    fill: style.highlight_color.with_alpha(style.user_fill_alpha),
                    width: style.highlight_line_width,
                }
            } else {
                Paint {
                    stroke: style.user_color,
                    fill: style.user_color.with_alpha(style.user_fill_alpha),
                    width: style.line_width,
                }
            };
            drawn += usize::from(self.draw_shape(shape, &paint, bridge, surface)?);
        }

        if let Some(draft) = frame.draft {
            let paint = Paint {
                stroke: style.user_color,
                fill: style.user_color.with_alpha(style.user_fill_alpha),
                width: style.line_width,
            };
            surface.set_dash(&style.draft_dash)?;
            let drew = self.draw_shape(draft, &paint, bridge, surface);
            surface.set_dash(&[])?;
            drawn += usize::from(drew?);
        }

        Ok(drawn)
    }

    fn draw_shape(
        &self,
        shape: &Shape,
        paint: &Paint,
        bridge: &dyn CoordinateBridge,
        surface: &mut dyn OverlaySurface,
    ) -> RenderingResult<bool> {
        let Some(projected) = shape.geometry.project(bridge) else {
            return Ok(false);
        };
        let pad = self.style.label_padding;
        surface.set_stroke(paint.stroke, paint.width);

        let label_at = match projected {
            Projected::HLine { y } => {
                surface.stroke_line(PixelPos::new(0.0, y), PixelPos::new(bridge.width(), y));
                PixelPos::new(pad, y - pad)
            }
            Projected::Segment { a, b } => {
                let b = if a.distance(b) < MIN_EXTENT_PX { PixelPos::new(a.x + MIN_EXTENT_PX, a.y) } else { b };
                surface.stroke_line(a, b);
                PixelPos::new(b.x + pad, b.y - pad)
            }
            Projected::Rect(rect) => {
                let rect = PixelRect {
                    right: rect.right.max(rect.left + MIN_EXTENT_PX),
                    bottom: rect.bottom.max(rect.top + MIN_EXTENT_PX),
                    ..rect
                };
                surface.set_fill(paint.fill);
                surface.fill_rect(rect);
                surface.stroke_rect(rect);
                PixelPos::new(rect.left + pad, rect.top - pad)
            }
        };

        if let Some(label) = shape.label.as_deref().filter(|label| !label.is_empty()) {
            surface.set_fill(paint.stroke);
            surface.fill_text(label, label_at, &self.style.label_font)?;
        }
        Ok(true)
    }
}
