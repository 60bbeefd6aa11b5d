//! Browser-side wiring of the overlay: network loads, the live stream, the
//! drawing surface and the status line shown to the host.

use super::config::OverlayConfig;
use super::overlay::ChartOverlay;
use super::session::{SessionTicket, StreamSlot};
use crate::domain::errors::AppError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Candle, FeedUpdate, Symbol};
use crate::infrastructure::auth::LayeredTokenProvider;
use crate::infrastructure::http::OverlayHttpClient;
use crate::infrastructure::rendering::{OverlayRenderer, OverlaySurface};
use crate::infrastructure::storage::BrowserStorage;
use crate::infrastructure::websocket::{LiveCandleStream, parse_candle_message};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Called after every applied stream update. Shared so a listener may
/// replace or remove itself while it runs.
pub type CandleListener = Rc<dyn Fn(&Candle)>;

/// Owns every resource scoped to one mounted overlay.
///
/// Single-threaded: all state sits behind `RefCell`s and no borrow is held
/// across an `.await`.
pub struct OverlayRuntime {
    config: OverlayConfig,
    overlay: RefCell<ChartOverlay>,
    http: OverlayHttpClient,
    renderer: OverlayRenderer,
    stream: RefCell<StreamSlot>,
    surface: RefCell<Option<Box<dyn OverlaySurface>>>,
    status: RefCell<String>,
    candle_listener: RefCell<Option<CandleListener>>,
}

impl OverlayRuntime {
    /// Runtime backed by browser storage and the layered token lookup.
    pub fn browser(config: OverlayConfig) -> Rc<Self> {
        let tokens = LayeredTokenProvider::browser(&config.token_param, &config.token_storage_key);
        let http = OverlayHttpClient::new(&config.api_base_url).with_token_provider(Rc::new(tokens));
        let overlay = ChartOverlay::from_config(&config, Box::new(BrowserStorage::local()));
        Self::new(config, overlay, http)
    }

    pub fn new(config: OverlayConfig, overlay: ChartOverlay, http: OverlayHttpClient) -> Rc<Self> {
        let renderer = OverlayRenderer::new(config.style.clone());
        Rc::new(Self {
            config,
            overlay: RefCell::new(overlay),
            http,
            renderer,
            stream: RefCell::new(StreamSlot::new()),
            surface: RefCell::new(None),
            status: RefCell::new("Idle".to_string()),
            candle_listener: RefCell::new(None),
        })
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    fn set_status(&self, status: impl Into<String>) {
        *self.status.borrow_mut() = status.into();
    }

    /// Read-only access to the overlay state.
    pub fn inspect<R>(&self, f: impl FnOnce(&ChartOverlay) -> R) -> R {
        f(&self.overlay.borrow())
    }

    /// Mutate the overlay, then redraw if anything changed.
    pub fn update<R>(&self, f: impl FnOnce(&mut ChartOverlay) -> R) -> R {
        let result = f(&mut self.overlay.borrow_mut());
        self.redraw();
        result
    }

    pub fn attach_surface(&self, surface: Box<dyn OverlaySurface>) {
        *self.surface.borrow_mut() = Some(surface);
        self.render_now();
    }

    pub fn set_candle_listener(&self, listener: Option<CandleListener>) {
        *self.candle_listener.borrow_mut() = listener;
    }

    /// Redraw if the overlay changed since the last frame.
    pub fn redraw(&self) {
        let mut surface = self.surface.borrow_mut();
        let Some(surface) = surface.as_mut() else {
            return;
        };
        if let Err(error) = self.overlay.borrow_mut().render_if_needed(&self.renderer, surface.as_mut()) {
            get_logger().error(LogComponent::Application("OverlayRuntime"), &format!("❌ {error}"));
        }
    }

    /// Redraw unconditionally.
    pub fn render_now(&self) {
        let mut surface = self.surface.borrow_mut();
        let Some(surface) = surface.as_mut() else {
            return;
        };
        if let Err(error) = self.overlay.borrow_mut().render(&self.renderer, surface.as_mut()) {
            get_logger().error(LogComponent::Application("OverlayRuntime"), &format!("❌ {error}"));
        }
    }

    /// Display `symbol`: fetch its history, then attach its live stream.
    ///
    /// The previous symbol's stream is released first. If another load or a
    /// teardown happens while the history request is in flight, the response
    /// is dropped and `Ok(0)` returned.
    pub async fn load_symbol(self: Rc<Self>, symbol: Symbol) -> Result<usize, AppError> {
        let ticket = self.overlay.borrow_mut().switch_symbol(symbol.clone());
        self.stream.borrow_mut().release();
        self.redraw();
        self.set_status(format!("Loading {symbol}..."));

        let candles =
            match self.http.fetch_candles(&symbol, self.config.timeframe, self.config.history_limit).await {
                Ok(candles) => candles,
                Err(error) => {
                    self.fail(&ticket, &error);
                    return Err(error);
                }
            };

        if !self.overlay.borrow_mut().apply_history(&ticket, candles) {
            return Ok(0);
        }
        let count = self.overlay.borrow().feed().candles().len();
        self.redraw();
        self.start_stream(&ticket);
        self.set_status(format!("{symbol}: {count} candles, live"));
        Ok(count)
    }

    /// Refresh the engine layer for the displayed symbol.
    pub async fn sync_annotations(self: Rc<Self>) -> Result<usize, AppError> {
        let Some(ticket) = self.overlay.borrow().begin_sync() else {
            return Err(AppError::Validation("no symbol loaded".to_string()));
        };
        let payload = match self.http.fetch_annotations(ticket.symbol()).await {
            Ok(payload) => payload,
            Err(error) => {
                self.fail(&ticket, &error);
                return Err(error);
            }
        };
        let adaptation = self.overlay.borrow_mut().apply_engine_annotations(&ticket, &payload);
        self.redraw();
        Ok(adaptation.map(|adaptation| adaptation.shapes.len()).unwrap_or(0))
    }

    /// Release the stream and all per-symbol state.
    pub fn teardown(&self) {
        self.stream.borrow_mut().release();
        self.overlay.borrow_mut().teardown();
        self.redraw();
        self.set_status("Idle");
    }

    fn fail(&self, ticket: &SessionTicket, error: &AppError) {
        get_logger().error(LogComponent::Application("OverlayRuntime"), &format!("❌ {error}"));
        if self.overlay.borrow().feed().is_current(ticket) {
            self.set_status(error.to_string());
        }
    }

    fn start_stream(self: &Rc<Self>, ticket: &SessionTicket) {
        let stream = LiveCandleStream::new(&self.config.stream_url_template, ticket.symbol().clone());
        let on_message = {
            let runtime = Rc::downgrade(self);
            let ticket = ticket.clone();
            move |text: &str| {
                if let Some(runtime) = runtime.upgrade() {
                    runtime.handle_message(&ticket, text);
                }
            }
        };
        let on_closed = {
            let runtime: Weak<Self> = Rc::downgrade(self);
            let ticket = ticket.clone();
            move |result: Result<(), AppError>| {
                let Some(runtime) = runtime.upgrade() else {
                    return;
                };
                if runtime.overlay.borrow().feed().is_current(&ticket) {
                    match result {
                        Ok(()) => runtime.set_status(format!("{}: stream closed", ticket.symbol())),
                        Err(error) => runtime.set_status(error.to_string()),
                    }
                }
            }
        };
        let handle = stream.spawn(on_message, on_closed);
        self.stream.borrow_mut().replace(ticket.symbol().clone(), handle);
    }

    fn handle_message(&self, ticket: &SessionTicket, text: &str) {
        let candle = match parse_candle_message(text) {
            Ok(candle) => candle,
            Err(error) => {
                get_logger().warn(
                    LogComponent::Application("OverlayRuntime"),
                    &format!("unreadable stream message: {error}"),
                );
                return;
            }
        };
        let update = self.overlay.borrow_mut().apply_update(ticket, candle);
        if !matches!(update, Some(FeedUpdate::Replaced | FeedUpdate::Appended)) {
            return;
        }
        self.redraw();

        let last = self.overlay.borrow().feed().buffer().last().cloned();
        let listener = self.candle_listener.borrow().clone();
        if let (Some(candle), Some(listener)) = (last, listener) {
            listener(&candle);
        }
    }
}
