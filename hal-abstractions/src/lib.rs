//! Hardware abstraction traits for WiFi transceiver firmware
//!
//! This crate defines the driver facade that board support packages implement
//! over their AT-command transport (ESP8266 and friends). It says nothing about
//! serial framing or response parsing; those stay inside the BSP.
//!
//! Every method maps onto one transceiver operation. Methods report plain
//! success or failure and leave the error taxonomy to the caller, which knows
//! which bring-up stage or socket operation it was running.

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

use core::fmt;
use core::future::Future;
use core::net::Ipv4Addr;

use embassy_time::Duration;
use heapless::String;

/// Longest SSID an access point can advertise (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Operating mode passed to [`Transceiver::startup`]
///
/// Discriminants follow the ESP8266 `AT+CWMODE` numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiMode {
    Station = 1,
    SoftAp = 2,
    StationSoftAp = 3,
}

/// Interface on which DHCP is toggled by [`Transceiver::dhcp`]
///
/// Discriminants follow the ESP8266 `AT+CWDHCP` numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DhcpMode {
    SoftAp = 0,
    Station = 1,
    Both = 2,
}

/// Transport protocol of a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// Protocol tag used by `AT+CIPSTART`
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "TCP",
            Self::Udp => "UDP",
        }
    }
}

/// WiFi security scheme of an access point or stored credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Security {
    None,
    Wep,
    WpaPsk,
    Wpa2Psk,
    WpaWpa2Psk,
    #[default]
    Unknown,
}

/// 48-bit hardware address (MAC / BSSID)
///
/// Displays as six lowercase, zero-padded hex pairs separated by colons,
/// e.g. `00:25:9c:cf:1c:ac`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a, b, c, d, e, g
        )
    }
}

/// One access point reported by [`Transceiver::scan`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccessPoint {
    pub ssid: String<MAX_SSID_LEN>,
    pub bssid: MacAddress,
    pub security: Security,
    /// Received signal strength in dBm (negative)
    pub rssi: i8,
    pub channel: u8,
}

/// Hardware channel number of a socket on the transceiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SocketId(u8);

impl SocketId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Driver facade for a serial WiFi transceiver
///
/// Implementations are not expected to lock internally: callers hold
/// `&mut self` for the duration of every operation, which serializes access
/// to the single physical module.
///
/// The timeout set by [`set_timeout`](Transceiver::set_timeout) applies to every
/// subsequent operation until it is changed again.
pub trait Transceiver {
    /// Driver-specific failure detail (transport error, `ERROR` response, ...)
    type Error: fmt::Debug;

    /// Set the response timeout for subsequent operations
    fn set_timeout(&mut self, timeout: Duration);

    /// Reset the module and bring it up in `mode`
    fn startup(&mut self, mode: WifiMode) -> impl Future<Output = Result<(), Self::Error>>;

    /// Enable or disable the DHCP client on `mode`'s interface
    fn dhcp(
        &mut self,
        enabled: bool,
        mode: DhcpMode,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Associate with an access point
    fn connect(
        &mut self,
        ssid: &str,
        passphrase: &str,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Leave the current access point
    fn disconnect(&mut self) -> impl Future<Output = Result<(), Self::Error>>;

    /// Station IPv4 address, `None` until DHCP has assigned one
    fn ip_address(&mut self) -> impl Future<Output = Option<Ipv4Addr>>;

    /// Station MAC address
    fn mac_address(&mut self) -> impl Future<Output = Option<MacAddress>>;

    /// Default gateway
    fn gateway(&mut self) -> impl Future<Output = Option<Ipv4Addr>>;

    /// Network mask
    fn netmask(&mut self) -> impl Future<Output = Option<Ipv4Addr>>;

    /// Signal strength of the associated access point in dBm, 0 if unknown
    fn rssi(&mut self) -> impl Future<Output = i8>;

    /// Scan for access points, filling at most `results.len()` entries
    ///
    /// Returns the number of entries written.
    fn scan(
        &mut self,
        results: &mut [AccessPoint],
    ) -> impl Future<Output = Result<usize, Self::Error>>;

    /// Open a connection on hardware socket `id`
    fn open(
        &mut self,
        protocol: Protocol,
        id: SocketId,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Close hardware socket `id`
    fn close(&mut self, id: SocketId) -> impl Future<Output = Result<(), Self::Error>>;

    /// Transmit `data` on hardware socket `id`
    fn send(&mut self, id: SocketId, data: &[u8]) -> impl Future<Output = Result<(), Self::Error>>;
}
