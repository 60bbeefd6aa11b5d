use crate::domain::errors::{AppError, NetworkResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::Symbol;
use futures::StreamExt;
use futures::future::{AbortHandle, Abortable};
use gloo_net::websocket::Message;
use gloo_net::websocket::futures::WebSocket;
use wasm_bindgen_futures::spawn_local;

/// Placeholder in stream URL templates replaced by the symbol.
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";

/// Live candle stream for one symbol.
///
/// The connection is never re-established here: when it ends or fails the
/// stream finishes and `on_closed` reports why. Reconnecting is up to the host.
pub struct LiveCandleStream {
    symbol: Symbol,
    url: String,
}

impl LiveCandleStream {
    pub fn new(url_template: &str, symbol: Symbol) -> Self {
        let url = url_template.replace(SYMBOL_PLACEHOLDER, symbol.value());
        Self { symbol, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Open the socket and feed every text frame to `on_message` until the
    /// connection ends.
    pub async fn run<F>(self, mut on_message: F) -> NetworkResult<()>
    where
        F: FnMut(&str),
    {
        get_logger().info(
            LogComponent::Infrastructure("LiveStream"),
            &format!("🔌 Connecting to {}", self.url),
        );
        let mut socket = WebSocket::open(&self.url)
            .map_err(|e| AppError::Network(format!("Failed to open WebSocket: {e:?}")))?;

        while let Some(message) = socket.next().await {
            match message {
                Ok(Message::Text(text)) => on_message(&text),
                Ok(Message::Bytes(_)) => {}
                Err(e) => {
                    return Err(AppError::Network(format!("WebSocket error: {e:?}")));
                }
            }
        }

        get_logger().info(
            LogComponent::Infrastructure("LiveStream"),
            &format!("🔌 Stream for {} closed", self.symbol),
        );
        Ok(())
    }

    /// Run on the local executor. Aborting the returned handle drops the
    /// socket, which closes the connection.
    pub fn spawn<F, C>(self, on_message: F, on_closed: C) -> AbortHandle
    where
        F: FnMut(&str) + 'static,
        C: FnOnce(NetworkResult<()>) + 'static,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let symbol = self.symbol.clone();
        spawn_local(async move {
            match Abortable::new(self.run(on_message), registration).await {
                Ok(result) => {
                    if let Err(error) = &result {
                        get_logger().error(
                            LogComponent::Infrastructure("LiveStream"),
                            &format!("❌ {symbol}: {error}"),
                        );
                    }
                    on_closed(result);
                }
                Err(_aborted) => get_logger().debug(
                    LogComponent::Infrastructure("LiveStream"),
                    &format!("stream for {symbol} aborted"),
                ),
            }
        });
        handle
    }
}
