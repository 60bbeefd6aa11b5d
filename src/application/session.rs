use crate::domain::logging::LogComponent;
use crate::domain::market_data::Symbol;
use crate::log_info;
use futures::future::AbortHandle;
use std::cell::Cell;
use std::rc::Rc;

/// Generation counter guarding asynchronous responses.
///
/// Every mount or symbol change starts a new generation; a response carrying
/// a ticket from an older generation must be dropped. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct SessionGuard {
    generation: Rc<Cell<u64>>,
}

/// Proof that a request was issued for a given symbol and generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    generation: u64,
    symbol: Symbol,
}

impl SessionTicket {
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation for `symbol`, outdating every earlier ticket.
    pub fn begin(&self, symbol: Symbol) -> SessionTicket {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        SessionTicket { generation, symbol }
    }

    /// Outdate every ticket without starting a new session (teardown).
    pub fn invalidate(&self) {
        self.generation.set(self.generation.get() + 1);
    }

    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        ticket.generation == self.generation.get()
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }
}

/// Holds the single live stream of the displayed symbol.
///
/// Installing a new stream aborts the previous one; dropping the slot
/// aborts whatever is still running.
#[derive(Debug, Default)]
pub struct StreamSlot {
    active: Option<(Symbol, AbortHandle)>,
}

impl StreamSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, symbol: Symbol, handle: AbortHandle) {
        self.release();
        log_info!(LogComponent::Application("StreamSlot"), "🔌 stream attached for {}", symbol);
        self.active = Some((symbol, handle));
    }

    /// Abort the active stream, if any. Returns `true` if one was running.
    pub fn release(&mut self) -> bool {
        match self.active.take() {
            Some((symbol, handle)) => {
                handle.abort();
                log_info!(LogComponent::Application("StreamSlot"), "🛑 stream released for {}", symbol);
                true
            }
            None => false,
        }
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.active.as_ref().map(|(symbol, _)| symbol)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for StreamSlot {
    fn drop(&mut self) {
        self.release();
    }
}
