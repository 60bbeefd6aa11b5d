use crate::domain::errors::{AppError, NetworkResult};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Candle, Symbol, Timeframe};
use crate::infrastructure::auth::TokenProvider;
use crate::infrastructure::websocket::parse_history_response;
use gloo_net::http::Request;
use serde_json::Value;
use std::rc::Rc;

pub const MAX_HISTORY_LIMIT: usize = 5000;

/// Clamp a requested history size to what the endpoint serves.
pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_HISTORY_LIMIT)
}

/// HTTP client for candle history and annotation sync
#[derive(Clone)]
pub struct OverlayHttpClient {
    base_url: String,
    token_provider: Option<Rc<dyn TokenProvider>>,
}

impl OverlayHttpClient {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), token_provider: None }
    }

    pub fn with_token_provider(mut self, provider: Rc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    pub fn candles_url(&self, symbol: &Symbol, timeframe: Timeframe, limit: usize) -> String {
        format!(
            "{}/api/markets/{}/candles?tf={}&limit={}",
            self.base_url,
            symbol.value(),
            timeframe,
            clamp_limit(limit)
        )
    }

    pub fn annotations_url(&self, symbol: &Symbol) -> String {
        format!("{}/api/markets/{}/annotations", self.base_url, symbol.value())
    }

    /// Bulk candle history. Order and duplicates are left for the caller.
    pub async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: usize,
    ) -> NetworkResult<Vec<Candle>> {
        let url = self.candles_url(symbol, timeframe, limit);
        get_logger().info(
            LogComponent::Infrastructure("OverlayHttp"),
            &format!("📡 Fetching candles for {symbol} ({timeframe})"),
        );
        let document = self.get_json(&url).await?;
        let candles = parse_history_response(&document)?;
        get_logger().info(
            LogComponent::Infrastructure("OverlayHttp"),
            &format!("✅ Loaded {} candles for {symbol}", candles.len()),
        );
        Ok(candles)
    }

    /// Raw annotation payload; the adapter validates it item by item.
    pub async fn fetch_annotations(&self, symbol: &Symbol) -> NetworkResult<Value> {
        self.get_json(&self.annotations_url(symbol)).await
    }

    async fn get_json(&self, url: &str) -> NetworkResult<Value> {
        let mut request = Request::get(url).header("Accept", "application/json");
        if let Some(token) = self.token_provider.as_ref().and_then(|provider| provider.token()) {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to send request: {e:?}")))?;
        if !response.ok() {
            return Err(AppError::Network(format!(
                "HTTP error: {} - {}",
                response.status(),
                response.status_text()
            )));
        }
        response.json::<Value>().await.map_err(|e| AppError::Parse(format!("Failed to parse JSON: {e:?}")))
    }
}
