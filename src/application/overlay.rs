use super::config::OverlayConfig;
use super::live_feed::LiveDataFeed;
use super::session::SessionTicket;
use crate::domain::chart::{CoordinateBridge, PixelPos, Viewport, ViewportBridge};
use crate::domain::drawing::{
    DrawingRepository, EngineAdaptation, EngineShape, HitTester, InteractionController, KeyValueStorage,
    PointerOutcome, Shape, ShapeId, ShapeStore, Tool, adapt_engine_annotations,
};
use crate::domain::errors::RenderingResult;
use crate::domain::logging::{LogComponent, get_time_provider};
use crate::domain::market_data::{Candle, FeedUpdate, Symbol};
use crate::infrastructure::rendering::{OverlayFrame, OverlayRenderer, OverlaySurface};
use crate::log_debug;
use serde_json::Value;

/// The overlay aggregate: user shapes, the engine layer, the gesture
/// controller, the coordinate bridge and the candle feed.
///
/// Engine sync and gestures are independent: a sync only ever replaces the
/// engine layer, gestures only ever touch the user store.
pub struct ChartOverlay {
    store: ShapeStore,
    engine: Vec<EngineShape>,
    controller: InteractionController,
    bridge: ViewportBridge,
    feed: LiveDataFeed,
    needs_redraw: bool,
}

impl ChartOverlay {
    pub fn new(store: ShapeStore, hit_tester: HitTester, history_limit: usize) -> Self {
        Self {
            store,
            engine: Vec::new(),
            controller: InteractionController::new(hit_tester),
            bridge: ViewportBridge::default(),
            feed: LiveDataFeed::new(history_limit),
            needs_redraw: true,
        }
    }

    /// Overlay persisting into `storage` under the configured key.
    pub fn from_config(config: &OverlayConfig, storage: Box<dyn KeyValueStorage>) -> Self {
        let store = ShapeStore::open(DrawingRepository::new(storage, config.storage_key.clone()));
        Self::new(store, HitTester::new(config.hit_tolerance_px), config.history_limit)
    }

    fn now_ms() -> i64 {
        get_time_provider().current_timestamp() as i64
    }

    fn touch(&mut self, changed: bool) -> bool {
        self.needs_redraw |= changed;
        changed
    }

    // Viewport

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.bridge.set_viewport(viewport);
        self.needs_redraw = true;
    }

    pub fn bridge(&self) -> &ViewportBridge {
        &self.bridge
    }

    // Gestures

    pub fn pointer_down(&mut self, pos: PixelPos) -> PointerOutcome {
        let outcome = self.controller.pointer_down(pos, &self.bridge, &mut self.store, Self::now_ms());
        self.touch(outcome.changed());
        outcome
    }

    pub fn pointer_move(&mut self, pos: PixelPos) -> PointerOutcome {
        let outcome = self.controller.pointer_move(pos, &self.bridge, &mut self.store);
        self.touch(outcome.changed());
        outcome
    }

    pub fn pointer_up(&mut self, pos: PixelPos) -> PointerOutcome {
        let outcome = self.controller.pointer_up(pos, &self.bridge, &mut self.store);
        self.touch(outcome.changed());
        outcome
    }

    pub fn tool(&self) -> Tool {
        self.controller.tool()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.controller.set_tool(tool, &mut self.store);
        self.needs_redraw = true;
    }

    pub fn cancel_gesture(&mut self) -> bool {
        let cancelled = self.controller.cancel(&mut self.store);
        self.touch(cancelled)
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    // User shapes

    /// Remove the most recently committed user shape. Engine shapes are never touched.
    pub fn undo(&mut self) -> Option<Shape> {
        self.controller.cancel(&mut self.store);
        let removed = self.store.undo();
        self.controller.prune(&self.store);
        self.touch(removed.is_some());
        removed
    }

    pub fn clear_all(&mut self) {
        self.controller.cancel(&mut self.store);
        self.store.clear();
        self.controller.prune(&self.store);
        self.needs_redraw = true;
    }

    pub fn user_shapes(&self) -> &[Shape] {
        self.store.shapes()
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn selected(&self) -> Option<&ShapeId> {
        self.controller.selected()
    }

    pub fn select(&mut self, id: &ShapeId) -> bool {
        let selected = self.controller.select(id, &self.store);
        self.touch(selected)
    }

    pub fn clear_selection(&mut self) {
        self.controller.clear_selection();
        self.needs_redraw = true;
    }

    // Candle feed

    /// Start displaying `symbol`. The engine layer belongs to the previous
    /// symbol and is dropped; user drawings are kept.
    pub fn switch_symbol(&mut self, symbol: Symbol) -> SessionTicket {
        self.reset_engine();
        self.feed.switch_symbol(symbol)
    }

    pub fn apply_history(&mut self, ticket: &SessionTicket, candles: Vec<Candle>) -> bool {
        let applied = self.feed.apply_history(ticket, candles);
        self.touch(applied)
    }

    pub fn apply_update(&mut self, ticket: &SessionTicket, candle: Candle) -> Option<FeedUpdate> {
        let update = self.feed.apply_update(ticket, candle);
        self.touch(matches!(update, Some(FeedUpdate::Replaced | FeedUpdate::Appended)));
        update
    }

    pub fn feed(&self) -> &LiveDataFeed {
        &self.feed
    }

    // Engine layer

    /// Ticket to attach to an annotation request, if a symbol is displayed.
    pub fn begin_sync(&self) -> Option<SessionTicket> {
        self.feed.current_ticket().cloned()
    }

    /// Replace the engine layer from a sync response. `None` if the ticket is stale.
    pub fn apply_engine_annotations(&mut self, ticket: &SessionTicket, payload: &Value) -> Option<EngineAdaptation> {
        if !self.feed.is_current(ticket) {
            log_debug!(
                LogComponent::Application("ChartOverlay"),
                "discarding stale annotations for {}",
                ticket.symbol()
            );
            return None;
        }
        let now_ms = Self::now_ms();
        let adaptation =
            adapt_engine_annotations(payload, self.feed.time_span(), now_ms as f64 / 1000.0, now_ms);
        self.engine = adaptation.shapes.clone();
        self.needs_redraw = true;
        Some(adaptation)
    }

    /// Drop the engine layer; user shapes are untouched.
    pub fn reset_engine(&mut self) {
        self.engine.clear();
        self.needs_redraw = true;
    }

    pub fn engine_shapes(&self) -> &[EngineShape] {
        &self.engine
    }

    // Lifetime

    /// Release per-symbol state. Responses still in flight become stale.
    pub fn teardown(&mut self) {
        self.controller.cancel(&mut self.store);
        self.feed.teardown();
        self.reset_engine();
    }

    // Rendering

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn frame(&self) -> OverlayFrame<'_> {
        OverlayFrame {
            engine: &self.engine,
            user: self.store.shapes(),
            draft: self.controller.draft(),
            selected: self.controller.selected(),
        }
    }

    /// Redraw onto `surface` and clear the redraw flag.
    pub fn render(&mut self, renderer: &OverlayRenderer, surface: &mut dyn OverlaySurface) -> RenderingResult<usize> {
        let bridge: &dyn CoordinateBridge = &self.bridge;
        let drawn = renderer.render(&self.frame(), bridge, surface)?;
        self.needs_redraw = false;
        Ok(drawn)
    }

    /// Render only when something changed since the last frame.
    pub fn render_if_needed(
        &mut self,
        renderer: &OverlayRenderer,
        surface: &mut dyn OverlaySurface,
    ) -> RenderingResult<Option<usize>> {
        if !self.needs_redraw {
            return Ok(None);
        }
        self.render(renderer, surface).map(Some)
    }
}
