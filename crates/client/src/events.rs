//! Broadcast signals decoupling the cart/session core from its observers.
//!
//! The core never knows what is rendering it. Anything that changes a cart
//! (guest or server-side) emits [`ClientEvent::CartChanged`]; the gateway
//! emits [`ClientEvent::SessionExpired`] when a session cannot be recovered
//! and the user must be sent back to the login surface. Views subscribe and
//! refresh; the emitting side never blocks on them.

use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Slow subscribers past this depth see
/// `RecvError::Lagged` and should do a full refresh.
const CHANNEL_CAPACITY: usize = 32;

/// Signals emitted by the client core.
///
/// Events carry no payload; subscribers re-read whatever state they display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    /// A cart (guest or server-side) was mutated.
    CartChanged,
    /// The session is unrecoverable; route the user to the login surface.
    SessionExpired,
}

/// Broadcast bus for [`ClientEvent`]s.
///
/// Cheap to clone; all clones share one channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Create a new event bus.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all current subscribers.
    ///
    /// An absent or lagging subscriber never fails the emitting operation.
    pub fn emit(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_ok() {
        let bus = EventBus::new();
        bus.emit(ClientEvent::CartChanged);
    }

    #[test]
    fn test_subscribers_receive_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(ClientEvent::CartChanged);
        bus.emit(ClientEvent::SessionExpired);

        assert_eq!(rx.try_recv().unwrap(), ClientEvent::CartChanged);
        assert_eq!(rx.try_recv().unwrap(), ClientEvent::SessionExpired);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_clones_share_the_channel() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.clone().emit(ClientEvent::CartChanged);
        assert_eq!(rx.try_recv().unwrap(), ClientEvent::CartChanged);
    }
}
