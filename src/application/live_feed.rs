use super::session::{SessionGuard, SessionTicket};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Candle, CandleBuffer, FeedUpdate, Symbol, Timestamp};
use crate::{log_debug, log_warn};

/// Candle buffer of the displayed symbol: a bulk history load followed by
/// streamed updates.
///
/// Every history response and stream message is paired with the ticket of
/// the session that requested it; data for an outdated ticket is dropped.
#[derive(Debug)]
pub struct LiveDataFeed {
    buffer: CandleBuffer,
    guard: SessionGuard,
    current: Option<SessionTicket>,
    history_limit: usize,
}

impl LiveDataFeed {
    pub fn new(history_limit: usize) -> Self {
        Self::with_guard(SessionGuard::new(), history_limit)
    }

    pub fn with_guard(guard: SessionGuard, history_limit: usize) -> Self {
        Self { buffer: CandleBuffer::new(), guard, current: None, history_limit }
    }

    /// Start displaying `symbol`; outdates everything in flight.
    pub fn switch_symbol(&mut self, symbol: Symbol) -> SessionTicket {
        self.buffer.clear();
        let ticket = self.guard.begin(symbol);
        self.current = Some(ticket.clone());
        ticket
    }

    /// Stop displaying anything; outdates everything in flight.
    pub fn teardown(&mut self) {
        self.guard.invalidate();
        self.current = None;
        self.buffer.clear();
    }

    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.guard.is_current(ticket)
    }

    pub fn current_ticket(&self) -> Option<&SessionTicket> {
        self.current.as_ref().filter(|ticket| self.guard.is_current(ticket))
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.current_ticket().map(SessionTicket::symbol)
    }

    /// Replace the buffer with a history response. Returns `false` if stale.
    pub fn apply_history(&mut self, ticket: &SessionTicket, candles: Vec<Candle>) -> bool {
        if !self.is_current(ticket) {
            log_debug!(
                LogComponent::Application("LiveDataFeed"),
                "discarding stale history for {}",
                ticket.symbol()
            );
            return false;
        }
        self.buffer.replace_history(candles, self.history_limit);
        true
    }

    /// Merge one streamed candle. `None` if the ticket is stale.
    ///
    /// Appends past `history_limit` drop the oldest bar.
    pub fn apply_update(&mut self, ticket: &SessionTicket, candle: Candle) -> Option<FeedUpdate> {
        if !self.is_current(ticket) {
            log_debug!(
                LogComponent::Application("LiveDataFeed"),
                "discarding stale update for {}",
                ticket.symbol()
            );
            return None;
        }
        let update = self.buffer.apply_update(candle, self.history_limit);
        if update == FeedUpdate::Rejected {
            log_warn!(
                LogComponent::Application("LiveDataFeed"),
                "rejected out-of-order update for {}",
                ticket.symbol()
            );
        }
        Some(update)
    }

    pub fn buffer(&self) -> &CandleBuffer {
        &self.buffer
    }

    pub fn candles(&self) -> &[Candle] {
        self.buffer.candles()
    }

    pub fn time_span(&self) -> Option<(Timestamp, Timestamp)> {
        self.buffer.time_span()
    }
}
