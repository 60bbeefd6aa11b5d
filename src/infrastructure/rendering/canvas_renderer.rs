use super::overlay_renderer::OverlaySurface;
use crate::domain::chart::{Color, PixelPos, PixelRect};
use crate::domain::errors::{AppError, RenderingResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// [`OverlaySurface`] over a `<canvas>` 2D context.
pub struct Canvas2dSurface {
    context: CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        context.set_text_baseline("bottom");
        Self { context }
    }

    pub fn from_canvas(canvas: &HtmlCanvasElement) -> RenderingResult<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|_| AppError::Rendering("Failed to get 2D context".to_string()))?
            .ok_or_else(|| AppError::Rendering("2D context not available".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| AppError::Rendering("Failed to cast to 2D context".to_string()))?;
        Ok(Self::new(context))
    }

    /// Look the canvas up by element id.
    pub fn from_canvas_id(canvas_id: &str) -> RenderingResult<Self> {
        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(canvas_id))
            .ok_or_else(|| AppError::Rendering(format!("canvas '{canvas_id}' not found")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| AppError::Rendering(format!("'{canvas_id}' is not a canvas")))?;
        Self::from_canvas(&canvas)
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.context
    }
}

fn js_error(error: JsValue) -> AppError {
    AppError::Rendering(format!("{error:?}"))
}

impl OverlaySurface for Canvas2dSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.context.clear_rect(0.0, 0.0, width, height);
    }

    fn set_stroke(&mut self, color: Color, width: f64) {
        self.context.set_stroke_style_str(&color.to_css());
        self.context.set_line_width(width);
    }

    fn set_fill(&mut self, color: Color) {
        self.context.set_fill_style_str(&color.to_css());
    }

    fn set_dash(&mut self, pattern: &[f64]) -> RenderingResult<()> {
        let segments: js_sys::Array = pattern.iter().map(|v| JsValue::from_f64(*v)).collect();
        self.context.set_line_dash(&segments).map_err(js_error)
    }

    fn stroke_line(&mut self, from: PixelPos, to: PixelPos) {
        self.context.begin_path();
        self.context.move_to(from.x, from.y);
        self.context.line_to(to.x, to.y);
        self.context.stroke();
    }

    fn fill_rect(&mut self, rect: PixelRect) {
        self.context.fill_rect(rect.left, rect.top, rect.width(), rect.height());
    }

    fn stroke_rect(&mut self, rect: PixelRect) {
        self.context.stroke_rect(rect.left, rect.top, rect.width(), rect.height());
    }

    fn fill_text(&mut self, text: &str, at: PixelPos, font: &str) -> RenderingResult<()> {
        self.context.set_font(font);
        self.context.fill_text(text, at.x, at.y).map_err(js_error)
    }
}
