//! Socket shim over a serial WiFi transceiver
//!
//! - **`client`**: `NetworkClient` trait for protocol clients driven over the interface
//! - **`config`**: Timeouts, capacities and stored credentials
//! - **`error`**: Error enums for network and report operations
//! - **`events`**: Per-socket event callbacks
//! - **`manager`**: `WifiInterface` and the bring-up sequence
//! - **`slots`**: Fixed-capacity socket slot table
//! - **`socket`**: Socket handles, connect/send/sendto, `embedded-io-async` adapter
//!
//! ## Architecture
//!
//! The transceiver is a single shared device. Rather than a global driver
//! instance, [`WifiInterface`] owns it and is passed by `&mut` into every
//! operation, which both serializes access and lets tests substitute a fake.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod slots;
pub mod socket;

// Re-export commonly used types
pub use client::NetworkClient;
pub use config::{Credentials, Timeouts, SOCKET_COUNT};
pub use error::{NetworkError, ReportError};
pub use events::SocketEventHandler;
pub use manager::{LinkState, WifiInterface};
pub use socket::{Destination, Socket, SocketWriter};
