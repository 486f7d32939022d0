//! Network and report error types

/// Network operation errors
///
/// Every transceiver-facing operation fails fast with one of these; nothing in
/// this crate retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    /// Transceiver or transport failure
    DeviceError,
    /// No address assigned (DHCP did not complete)
    DhcpFailure,
    /// Association rejected or credentials wrong
    NoConnection,
    /// All socket slots are in use
    NoSocket,
    /// Operation not implemented by this driver
    Unsupported,
}

impl core::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DeviceError => write!(f, "Device error"),
            Self::DhcpFailure => write!(f, "DHCP failure"),
            Self::NoConnection => write!(f, "No connection"),
            Self::NoSocket => write!(f, "No socket available"),
            Self::Unsupported => write!(f, "Unsupported operation"),
        }
    }
}

impl core::error::Error for NetworkError {}

impl embedded_io::Error for NetworkError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::Unsupported => embedded_io::ErrorKind::Unsupported,
            Self::NoSocket => embedded_io::ErrorKind::OutOfMemory,
            Self::NoConnection => embedded_io::ErrorKind::NotConnected,
            Self::DhcpFailure => embedded_io::ErrorKind::AddrNotAvailable,
            Self::DeviceError => embedded_io::ErrorKind::Other,
        }
    }
}

/// Geolocation report errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Scan or transceiver failure
    Network(NetworkError),
    /// Scan completed but found no access points
    NoAccessPoints,
    /// Request could not be started (URI does not fit)
    RequestInit,
    /// Encoded report does not fit in the payload buffer
    PayloadOverflow,
}

impl From<NetworkError> for ReportError {
    fn from(e: NetworkError) -> Self {
        Self::Network(e)
    }
}

impl core::fmt::Display for ReportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Network(e) => write!(f, "Network error: {}", e),
            Self::NoAccessPoints => write!(f, "No access points found"),
            Self::RequestInit => write!(f, "Request initialization failed"),
            Self::PayloadOverflow => write!(f, "Payload buffer overflow"),
        }
    }
}

impl core::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            _ => None,
        }
    }
}
