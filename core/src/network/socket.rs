//! Socket handles and the send path
//!
//! A [`Socket`] owns one hardware slot from the interface's slot table until
//! it is passed to [`WifiInterface::socket_close`]. Only the connect/send
//! profile is implemented; bind, listen, accept and receive report
//! `NetworkError::Unsupported`.
//!
//! # Example
//!
//! ```ignore
//! let mut socket = iface.socket_open(Protocol::Udp)?;
//! iface.socket_sendto(&mut socket, "coap.example.net", 5683, payload).await?;
//! iface.socket_close(socket).await?;
//! ```

use core::net::SocketAddrV4;

use embedded_io_async::{ErrorType, Read, Write};
use wifi_hal_abstractions::{Protocol, SocketId, Transceiver};

use super::error::NetworkError;
use super::events::SocketEventHandler;
use super::manager::WifiInterface;

/// Remote endpoint a socket is connected to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Destination<'h> {
    pub host: &'h str,
    pub port: u16,
}

/// Caller-owned socket handle bound to one hardware slot
///
/// Host strings passed to connect/sendto are borrowed for `'h`, so the stored
/// destination always refers to live, unmodified storage.
#[derive(Debug)]
#[must_use = "sockets hold a hardware slot until closed with `socket_close`"]
pub struct Socket<'h> {
    id: SocketId,
    protocol: Protocol,
    connected: bool,
    destination: Option<Destination<'h>>,
    epoch: u32,
}

impl<'h> Socket<'h> {
    pub fn id(&self) -> SocketId {
        self.id
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Last destination the socket was connected to
    pub fn destination(&self) -> Option<Destination<'h>> {
        self.destination
    }

    fn is_connected_to(&self, host: &str, port: u16) -> bool {
        self.connected
            && self
                .destination
                .is_some_and(|d| d.port == port && d.host == host)
    }
}

impl<T: Transceiver> WifiInterface<T> {
    /// Claim a free slot for a new socket
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::NoSocket` if every slot is in use.
    pub fn socket_open<'h>(&mut self, protocol: Protocol) -> Result<Socket<'h>, NetworkError> {
        let id = self.slots.allocate().map_err(|e| {
            warn!("No free socket for {}", protocol.as_str());
            e
        })?;
        debug!("Opened {} socket {}", protocol.as_str(), id.index());
        Ok(Socket {
            id,
            protocol,
            connected: false,
            destination: None,
            epoch: self.epoch,
        })
    }

    /// Close the socket and free its slot
    ///
    /// The slot is released even when the transceiver fails to close the
    /// connection; that failure is still returned. Attached callbacks stay
    /// in place until [`socket_detach`](Self::socket_detach).
    pub async fn socket_close(&mut self, socket: Socket<'_>) -> Result<(), NetworkError> {
        self.driver.set_timeout(self.timeouts.misc);
        let result = self.driver.close(socket.id).await;
        self.slots.release(socket.id);
        debug!("Closed socket {}", socket.id.index());
        result.map_err(|_| {
            warn!("Transceiver close failed on socket {}", socket.id.index());
            NetworkError::DeviceError
        })
    }

    /// Open a connection from the socket's slot to `host:port`
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::DeviceError` if the transceiver rejects the open.
    pub async fn socket_connect<'h>(
        &mut self,
        socket: &mut Socket<'h>,
        host: &'h str,
        port: u16,
    ) -> Result<(), NetworkError> {
        self.driver.set_timeout(self.timeouts.misc);
        self.driver
            .open(socket.protocol, socket.id, host, port)
            .await
            .map_err(|_| {
                warn!(
                    "{} open to {}:{} failed",
                    socket.protocol.as_str(),
                    host,
                    port
                );
                NetworkError::DeviceError
            })?;
        socket.connected = true;
        socket.destination = Some(Destination { host, port });
        socket.epoch = self.epoch;
        Ok(())
    }

    /// Transmit on an already connected socket
    ///
    /// Does not connect; use [`socket_connect`](Self::socket_connect) or
    /// [`socket_sendto`](Self::socket_sendto) first. Returns the number of
    /// bytes accepted.
    pub async fn socket_send(
        &mut self,
        socket: &Socket<'_>,
        data: &[u8],
    ) -> Result<usize, NetworkError> {
        self.driver.set_timeout(self.timeouts.send);
        self.driver.send(socket.id, data).await.map_err(|_| {
            warn!("Send of {} bytes on socket {} failed", data.len(), socket.id.index());
            NetworkError::DeviceError
        })?;
        trace!("Sent {} bytes on socket {}", data.len(), socket.id.index());
        Ok(data.len())
    }

    /// Send to `host:port`, reconnecting if the socket points elsewhere
    ///
    /// One connection per destination: an unchanged destination reuses the
    /// open connection, a different one closes it and connects anew. A
    /// connection made before the last module restart is gone already and is
    /// reopened without a close.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::DeviceError` if the close, the connect or the
    /// send fails. A failed close still leaves the socket disconnected so the
    /// next call starts with a fresh connect.
    pub async fn socket_sendto<'h>(
        &mut self,
        socket: &mut Socket<'h>,
        host: &'h str,
        port: u16,
        data: &[u8],
    ) -> Result<usize, NetworkError> {
        if socket.connected && socket.epoch != self.epoch {
            debug!("Socket {} lost its connection to a restart", socket.id.index());
            socket.connected = false;
            socket.destination = None;
        }

        if socket.connected && !socket.is_connected_to(host, port) {
            debug!("Socket {} changing destination to {}:{}", socket.id.index(), host, port);
            self.driver.set_timeout(self.timeouts.misc);
            socket.connected = false;
            socket.destination = None;
            self.driver.close(socket.id).await.map_err(|_| {
                warn!("Close before reconnect failed on socket {}", socket.id.index());
                NetworkError::DeviceError
            })?;
        }

        if !socket.connected {
            self.socket_connect(socket, host, port).await?;
        }

        self.socket_send(socket, data).await
    }

    /// Register `handler` for events on the socket's slot, replacing any
    /// previous handler
    pub fn socket_attach(&mut self, socket: &Socket<'_>, handler: &'static dyn SocketEventHandler) {
        self.callbacks.attach(socket.id, handler);
    }

    pub fn socket_detach(&mut self, socket: &Socket<'_>) {
        self.callbacks.detach(socket.id);
    }

    /// Deliver a transceiver event to every attached socket handler
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch_event(&self) -> usize {
        self.callbacks.dispatch()
    }

    pub fn socket_bind(&mut self, _socket: &Socket<'_>, _port: u16) -> Result<(), NetworkError> {
        Err(NetworkError::Unsupported)
    }

    pub fn socket_listen(&mut self, _socket: &Socket<'_>, _backlog: usize) -> Result<(), NetworkError> {
        Err(NetworkError::Unsupported)
    }

    pub fn socket_accept<'h>(&mut self, _server: &Socket<'h>) -> Result<Socket<'h>, NetworkError> {
        Err(NetworkError::Unsupported)
    }

    pub async fn socket_recv(
        &mut self,
        _socket: &Socket<'_>,
        _buf: &mut [u8],
    ) -> Result<usize, NetworkError> {
        Err(NetworkError::Unsupported)
    }

    pub async fn socket_recvfrom(
        &mut self,
        _socket: &Socket<'_>,
        _buf: &mut [u8],
    ) -> Result<(usize, SocketAddrV4), NetworkError> {
        Err(NetworkError::Unsupported)
    }

    /// Borrow a connected socket as an `embedded-io-async` stream
    pub fn writer<'a, 'h>(&'a mut self, socket: &'a mut Socket<'h>) -> SocketWriter<'a, 'h, T> {
        SocketWriter {
            iface: self,
            socket,
        }
    }
}

/// `embedded-io-async` adapter over a connected socket
///
/// Writes go through [`WifiInterface::socket_send`]; reads are unsupported.
pub struct SocketWriter<'a, 'h, T: Transceiver> {
    iface: &'a mut WifiInterface<T>,
    socket: &'a mut Socket<'h>,
}

impl<T: Transceiver> ErrorType for SocketWriter<'_, '_, T> {
    type Error = NetworkError;
}

impl<T: Transceiver> Write for SocketWriter<'_, '_, T> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.iface.socket_send(&*self.socket, buf).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: Transceiver> Read for SocketWriter<'_, '_, T> {
    async fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        Err(NetworkError::Unsupported)
    }
}
