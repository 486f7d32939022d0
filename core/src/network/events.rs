//! Per-socket event callbacks
//!
//! The board wires the transceiver's event hook to
//! [`WifiInterface::dispatch_event`](super::WifiInterface::dispatch_event),
//! which fans the notification out to every attached handler.

use wifi_hal_abstractions::SocketId;

/// Receiver of socket event notifications
///
/// Whatever context the callback needs lives in the implementing value.
pub trait SocketEventHandler {
    fn on_event(&self, socket: SocketId);
}

impl<F: Fn(SocketId)> SocketEventHandler for F {
    fn on_event(&self, socket: SocketId) {
        self(socket)
    }
}

/// One optional handler per socket slot
pub(crate) struct CallbackTable<const N: usize> {
    handlers: [Option<&'static dyn SocketEventHandler>; N],
}

impl<const N: usize> CallbackTable<N> {
    pub(crate) const fn new() -> Self {
        Self { handlers: [None; N] }
    }

    /// Install `handler` for `id`, replacing any previous one
    pub(crate) fn attach(&mut self, id: SocketId, handler: &'static dyn SocketEventHandler) {
        if let Some(slot) = self.handlers.get_mut(id.index()) {
            *slot = Some(handler);
        }
    }

    pub(crate) fn detach(&mut self, id: SocketId) {
        if let Some(slot) = self.handlers.get_mut(id.index()) {
            *slot = None;
        }
    }

    #[cfg(test)]
    pub(crate) fn is_attached(&self, id: SocketId) -> bool {
        matches!(self.handlers.get(id.index()), Some(Some(_)))
    }

    /// Invoke every attached handler with its slot id
    pub(crate) fn dispatch(&self) -> usize {
        let mut notified = 0;
        for (index, handler) in self.handlers.iter().enumerate() {
            if let Some(handler) = handler {
                handler.on_event(SocketId::new(index as u8));
                notified += 1;
            }
        }
        notified
    }
}
