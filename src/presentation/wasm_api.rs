use gloo::utils::format::JsValueSerdeExt;
use js_sys::Promise;
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::application::OverlayConfig;
use crate::application::runtime::{CandleListener, OverlayRuntime};
use crate::domain::chart::{PixelPos, Viewport};
use crate::domain::drawing::{
    PointerOutcome, ShapeId, SignalSetup, Tool, build_setup_drawings, build_signal_annotations, encode_drawings,
};
use crate::domain::errors::AppError;
use crate::domain::logging::{LogComponent, get_logger, get_time_provider};
use crate::domain::market_data::{Candle, Symbol};
use crate::infrastructure::rendering::Canvas2dSurface;
use crate::infrastructure::websocket::CandleDto;

fn to_js(error: AppError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Chart overlay API for the hosting page.
///
/// The host owns the chart: it reports viewport changes and forwards
/// pointer events in canvas pixels. Everything else (drawings, engine
/// annotations, candle history and the live stream) is managed here.
#[wasm_bindgen]
pub struct ChartOverlayApi {
    runtime: Rc<OverlayRuntime>,
}

#[wasm_bindgen]
impl ChartOverlayApi {
    /// `config` is an optional JSON document overriding the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<ChartOverlayApi, JsValue> {
        let config = match config {
            Some(json) => OverlayConfig::from_json(&json).map_err(to_js)?,
            None => OverlayConfig::default(),
        };
        get_logger().info(
            LogComponent::Presentation("ChartOverlayApi"),
            &format!("🚀 Overlay created (storage key '{}')", config.storage_key),
        );
        Ok(Self { runtime: OverlayRuntime::browser(config) })
    }

    #[wasm_bindgen(js_name = attachCanvas)]
    pub fn attach_canvas(&self, canvas_id: &str) -> Result<(), JsValue> {
        let surface = Canvas2dSurface::from_canvas_id(canvas_id).map_err(to_js)?;
        self.runtime.attach_surface(Box::new(surface));
        Ok(())
    }

    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(
        &self,
        start_time: f64,
        end_time: f64,
        min_price: f64,
        max_price: f64,
        width: f64,
        height: f64,
    ) {
        let viewport = Viewport { start_time, end_time, min_price, max_price, width, height };
        self.runtime.update(|overlay| overlay.set_viewport(viewport));
    }

    /// Returns `true` if the event changed anything.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, x: f64, y: f64) -> bool {
        self.runtime.update(|overlay| overlay.pointer_down(PixelPos::new(x, y))).changed()
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f64, y: f64) -> bool {
        self.runtime.update(|overlay| overlay.pointer_move(PixelPos::new(x, y))).changed()
    }

    /// Returns the id of the committed or moved shape, if any.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self, x: f64, y: f64) -> Option<String> {
        match self.runtime.update(|overlay| overlay.pointer_up(PixelPos::new(x, y))) {
            PointerOutcome::Committed(id) | PointerOutcome::DragEnded(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// One of `select`, `level`, `trendline`, `zone`.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&self, tool: &str) -> Result<(), JsValue> {
        let tool = tool
            .parse::<Tool>()
            .map_err(|_| JsValue::from_str(&format!("Unknown tool: {tool}")))?;
        self.runtime.update(|overlay| overlay.set_tool(tool));
        Ok(())
    }

    #[wasm_bindgen(js_name = cancelGesture)]
    pub fn cancel_gesture(&self) -> bool {
        self.runtime.update(|overlay| overlay.cancel_gesture())
    }

    pub fn undo(&self) -> bool {
        self.runtime.update(|overlay| overlay.undo()).is_some()
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&self) {
        self.runtime.update(|overlay| overlay.clear_all());
    }

    #[wasm_bindgen(js_name = selectShape)]
    pub fn select_shape(&self, id: &str) -> bool {
        self.runtime.update(|overlay| overlay.select(&ShapeId::from(id)))
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&self) {
        self.runtime.update(|overlay| overlay.clear_selection());
    }

    #[wasm_bindgen(js_name = selectedId)]
    pub fn selected_id(&self) -> Option<String> {
        self.runtime.inspect(|overlay| overlay.selected().map(ShapeId::to_string))
    }

    /// Replace the engine layer with an annotation payload the host fetched itself.
    /// Returns the number of engine shapes.
    #[wasm_bindgen(js_name = applyAnnotations)]
    pub fn apply_annotations(&self, payload: JsValue) -> Result<usize, JsValue> {
        let payload: Value = payload
            .into_serde()
            .map_err(|e| JsValue::from_str(&format!("Invalid annotation payload: {e}")))?;
        let ticket = self
            .runtime
            .inspect(|overlay| overlay.begin_sync())
            .ok_or_else(|| JsValue::from_str("No symbol loaded"))?;
        let adaptation = self.runtime.update(|overlay| overlay.apply_engine_annotations(&ticket, &payload));
        Ok(adaptation.map(|adaptation| adaptation.shapes.len()).unwrap_or(0))
    }

    /// Resolves with the number of loaded candles.
    #[wasm_bindgen(js_name = loadSymbol)]
    pub fn load_symbol(&self, symbol: String) -> Promise {
        let runtime = Rc::clone(&self.runtime);
        future_to_promise(async move {
            let symbol = Symbol::new(&symbol).map_err(|e| JsValue::from_str(&e))?;
            let count = runtime.load_symbol(symbol).await.map_err(to_js)?;
            Ok(JsValue::from(count as u32))
        })
    }

    /// Resolves with the number of engine shapes.
    #[wasm_bindgen(js_name = syncAnnotations)]
    pub fn sync_annotations(&self) -> Promise {
        let runtime = Rc::clone(&self.runtime);
        future_to_promise(async move {
            let count = runtime.sync_annotations().await.map_err(to_js)?;
            Ok(JsValue::from(count as u32))
        })
    }

    /// Force a full redraw, e.g. after the host resized the canvas.
    pub fn render(&self) {
        self.runtime.render_now();
    }

    pub fn teardown(&self) {
        self.runtime.teardown();
    }

    pub fn status(&self) -> String {
        self.runtime.status()
    }

    /// User drawings in their persisted envelope form.
    #[wasm_bindgen(js_name = shapesJson)]
    pub fn shapes_json(&self) -> Result<String, JsValue> {
        let saved_at = get_time_provider().current_timestamp() as i64;
        self.runtime.inspect(|overlay| encode_drawings(overlay.user_shapes(), saved_at)).map_err(to_js)
    }

    /// Called with `{time, open, high, low, close}` after every applied stream update.
    #[wasm_bindgen(js_name = setCandleListener)]
    pub fn set_candle_listener(&self, callback: Option<js_sys::Function>) {
        let listener = callback.map(|callback| {
            Rc::new(move |candle: &Candle| {
                let Ok(value) = JsValue::from_serde(&CandleDto::from(candle)) else {
                    return;
                };
                if let Err(error) = callback.call1(&JsValue::NULL, &value) {
                    get_logger().warn(
                        LogComponent::Presentation("ChartOverlayApi"),
                        &format!("candle listener threw: {error:?}"),
                    );
                }
            }) as CandleListener
        });
        self.runtime.set_candle_listener(listener);
    }

    /// Annotation payload derived from a signal setup document.
    #[wasm_bindgen(js_name = buildSignalAnnotations)]
    pub fn build_signal_annotations(signal: JsValue) -> Result<JsValue, JsValue> {
        let signal: Value = signal
            .into_serde()
            .map_err(|e| JsValue::from_str(&format!("Invalid signal: {e}")))?;
        let annotations = build_signal_annotations(&SignalSetup::from_value(&signal));
        JsValue::from_serde(&annotations).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Like `buildSignalAnnotations`, with `Risk` and `Target` zones added.
    #[wasm_bindgen(js_name = buildSetupDrawings)]
    pub fn build_setup_drawings(signal: JsValue) -> Result<JsValue, JsValue> {
        let signal: Value = signal
            .into_serde()
            .map_err(|e| JsValue::from_str(&format!("Invalid signal: {e}")))?;
        let annotations = build_setup_drawings(&SignalSetup::from_value(&signal));
        JsValue::from_serde(&annotations).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
