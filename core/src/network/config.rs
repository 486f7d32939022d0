//! Network configuration structures

use core::fmt;

use embassy_time::Duration;
use heapless::String;
use wifi_hal_abstractions::{Security, WifiMode, MAX_SSID_LEN};

/// Number of hardware sockets the transceiver multiplexes
pub const SOCKET_COUNT: usize = 5;

/// Longest WPA passphrase
pub const MAX_PASSPHRASE_LEN: usize = 64;

/// Mode the transceiver is started in before scanning or associating
pub const CLIENT_MODE: WifiMode = WifiMode::StationSoftAp;

/// Per-operation transceiver timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeouts {
    /// Startup, association and scan
    pub connect: Duration,
    /// Socket send
    pub send: Duration,
    /// Socket receive (0 = non-blocking)
    pub recv: Duration,
    /// Housekeeping: socket open/close, disconnect
    pub misc: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(15_000),
            send: Duration::from_millis(500),
            recv: Duration::from_millis(0),
            misc: Duration::from_millis(500),
        }
    }
}

/// Stored access point credentials
///
/// Fixed-size buffers; [`Credentials::set`] truncates anything longer.
/// `Debug` and `defmt::Format` never print the passphrase.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub ssid: String<MAX_SSID_LEN>,
    pub passphrase: String<MAX_PASSPHRASE_LEN>,
    pub security: Security,
}

impl Credentials {
    /// Overwrite all fields, truncating over-long inputs
    pub fn set(&mut self, ssid: &str, passphrase: &str, security: Security) {
        self.ssid = truncated(ssid);
        self.passphrase = truncated(passphrase);
        self.security = security;
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("passphrase", &"<redacted>")
            .field("security", &self.security)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Credentials {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Credentials {{ ssid: {=str}, passphrase: <redacted>, security: {} }}",
            self.ssid.as_str(),
            self.security
        )
    }
}

/// Copy the longest prefix of `s` that fits in `N` bytes on a char boundary
fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut end = s.len().min(N);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::new();
    // Cannot fail: `end <= N`
    let _ = out.push_str(&s[..end]);
    out
}
