//! Network client trait
//!
//! Protocol clients that run on top of the interface (the geolocation reporter,
//! future telemetry senders) implement `NetworkClient` so the network task can
//! drive them without knowing their internals.

use core::future::Future;

use wifi_hal_abstractions::Transceiver;

use super::manager::WifiInterface;

/// Trait for network protocol clients
///
/// # Example Implementation
/// ```ignore
/// struct Heartbeat { socket: Socket<'static> }
///
/// impl<T: Transceiver> NetworkClient<T> for Heartbeat {
///     type Output = usize;
///     type Error = NetworkError;
///     async fn run(&mut self, iface: &mut WifiInterface<T>) -> Result<usize, NetworkError> {
///         iface.socket_sendto(&mut self.socket, "collector.local", 5683, b"ping").await
///     }
/// }
/// ```
pub trait NetworkClient<T: Transceiver> {
    /// Output type for successful client operation
    type Output;
    type Error;

    /// Run the client operation once
    ///
    /// For periodic operations, the caller should invoke this method on a
    /// schedule. Nothing is retried on failure.
    fn run(
        &mut self,
        iface: &mut WifiInterface<T>,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>>;
}
