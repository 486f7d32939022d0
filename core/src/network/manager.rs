//! Connection manager
//!
//! Owns the transceiver and runs network bring-up as one sequential protocol:
//! startup, DHCP, association, address check. Each stage fails fast with its
//! own error and no partial state is kept.

use core::net::Ipv4Addr;

use wifi_hal_abstractions::{AccessPoint, DhcpMode, MacAddress, Security, Transceiver};

use super::config::{Credentials, Timeouts, CLIENT_MODE, SOCKET_COUNT};
use super::error::NetworkError;
use super::events::CallbackTable;
use super::slots::SlotTable;

/// Link state of the interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    Idle,
    Starting,
    AcquiringAddress,
    Connected,
    Disconnected,
}

/// Socket-level network interface over one WiFi transceiver
///
/// Passed explicitly to every operation; holding `&mut` is what serializes
/// access to the module.
pub struct WifiInterface<T: Transceiver> {
    pub(super) driver: T,
    pub(super) timeouts: Timeouts,
    pub(super) slots: SlotTable<SOCKET_COUNT>,
    pub(super) callbacks: CallbackTable<SOCKET_COUNT>,
    /// Bumped on every transceiver startup; connections from an older
    /// epoch were dropped by the reset
    pub(super) epoch: u32,
    credentials: Credentials,
    state: LinkState,
}

impl<T: Transceiver> WifiInterface<T> {
    /// Create an interface with default timeouts
    pub fn new(driver: T) -> Self {
        Self::with_timeouts(driver, Timeouts::default())
    }

    pub fn with_timeouts(driver: T, timeouts: Timeouts) -> Self {
        Self {
            driver,
            timeouts,
            slots: SlotTable::new(),
            callbacks: CallbackTable::new(),
            epoch: 0,
            credentials: Credentials::default(),
            state: LinkState::Idle,
        }
    }

    pub fn driver(&self) -> &T {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut T {
        &mut self.driver
    }

    pub fn link_state(&self) -> LinkState {
        self.state
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Store access point credentials for the next bring-up
    ///
    /// Always overwrites; inputs longer than the fixed buffers are truncated.
    pub fn set_credentials(&mut self, ssid: &str, passphrase: &str, security: Security) {
        self.credentials.set(ssid, passphrase, security);
    }

    /// Store credentials and bring the network up
    ///
    /// # Errors
    ///
    /// * `NetworkError::Unsupported` - `channel` is not 0 (auto)
    /// * otherwise see [`connect_stored`](Self::connect_stored)
    pub async fn connect(
        &mut self,
        ssid: &str,
        passphrase: &str,
        security: Security,
        channel: u8,
    ) -> Result<(), NetworkError> {
        if channel != 0 {
            warn!("Channel selection is not supported (channel {})", channel);
            return Err(NetworkError::Unsupported);
        }
        self.set_credentials(ssid, passphrase, security);
        self.connect_stored().await
    }

    /// Bring the network up with the stored credentials
    ///
    /// # Errors
    ///
    /// * `NetworkError::DeviceError` - transceiver failed to start
    /// * `NetworkError::DhcpFailure` - DHCP could not be enabled, or no address
    ///   was assigned after association
    /// * `NetworkError::NoConnection` - association rejected
    pub async fn connect_stored(&mut self) -> Result<(), NetworkError> {
        self.driver.set_timeout(self.timeouts.connect);
        self.state = LinkState::Starting;
        let result = self.bring_up().await;
        self.state = match result {
            Ok(()) => LinkState::Connected,
            Err(_) => LinkState::Idle,
        };
        result
    }

    async fn bring_up(&mut self) -> Result<(), NetworkError> {
        self.start_transceiver().await?;

        self.state = LinkState::AcquiringAddress;
        self.driver
            .dhcp(true, DhcpMode::Station)
            .await
            .map_err(|_| {
                warn!("Enabling DHCP failed");
                NetworkError::DhcpFailure
            })?;

        info!("Associating with {}", self.credentials.ssid.as_str());
        self.driver
            .connect(&self.credentials.ssid, &self.credentials.passphrase)
            .await
            .map_err(|_| {
                warn!("Association with {} rejected", self.credentials.ssid.as_str());
                NetworkError::NoConnection
            })?;

        let ip = self.driver.ip_address().await.ok_or_else(|| {
            warn!("Associated but no address assigned");
            NetworkError::DhcpFailure
        })?;
        let octets = ip.octets();
        info!(
            "Network is UP, IP: {}.{}.{}.{}",
            octets[0], octets[1], octets[2], octets[3]
        );
        Ok(())
    }

    /// Reset the module into client mode
    ///
    /// Open socket connections do not survive this; sockets connected in an
    /// earlier epoch reconnect on their next `socket_sendto`.
    async fn start_transceiver(&mut self) -> Result<(), NetworkError> {
        info!("Starting transceiver");
        self.epoch = self.epoch.wrapping_add(1);
        self.driver.startup(CLIENT_MODE).await.map_err(|_| {
            warn!("Transceiver startup failed");
            NetworkError::DeviceError
        })
    }

    /// Leave the access point
    ///
    /// The link is considered down afterwards even if the transceiver reports
    /// a failure; the failure is still returned.
    pub async fn disconnect(&mut self) -> Result<(), NetworkError> {
        self.driver.set_timeout(self.timeouts.misc);
        let result = self.driver.disconnect().await;
        self.state = LinkState::Disconnected;
        result.map_err(|_| {
            warn!("Disconnect failed");
            NetworkError::DeviceError
        })
    }

    /// Start the transceiver and scan for access points
    ///
    /// The restart drops the association: the link state returns to
    /// [`LinkState::Idle`] and [`connect_stored`](Self::connect_stored) must
    /// run again before sockets are usable.
    ///
    /// Fills at most `results.len()` entries and returns how many were written.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::DeviceError` if startup or the scan fails, or if
    /// the transceiver reports more results than the buffer holds.
    pub async fn scan(&mut self, results: &mut [AccessPoint]) -> Result<usize, NetworkError> {
        self.driver.set_timeout(self.timeouts.connect);
        // Startup resets the module, so the link has to be brought up again
        let started = self.start_transceiver().await;
        self.state = LinkState::Idle;
        started?;

        let count = self.driver.scan(results).await.map_err(|_| {
            warn!("WiFi scan failed");
            NetworkError::DeviceError
        })?;
        if count > results.len() {
            error!("Scan reported {} results for {} slots", count, results.len());
            return Err(NetworkError::DeviceError);
        }
        debug!("Scan found {} access points", count);
        Ok(count)
    }

    pub async fn ip_address(&mut self) -> Option<Ipv4Addr> {
        self.driver.ip_address().await
    }

    pub async fn mac_address(&mut self) -> Option<MacAddress> {
        self.driver.mac_address().await
    }

    pub async fn gateway(&mut self) -> Option<Ipv4Addr> {
        self.driver.gateway().await
    }

    pub async fn netmask(&mut self) -> Option<Ipv4Addr> {
        self.driver.netmask().await
    }

    /// Signal strength of the current access point in dBm
    pub async fn rssi(&mut self) -> i8 {
        self.driver.rssi().await
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::testing::{Call, FakeTransceiver};

    fn connect_default(iface: &mut WifiInterface<FakeTransceiver>) -> Result<(), NetworkError> {
        block_on(iface.connect("home", "hunter22", Security::Wpa2Psk, 0))
    }

    #[test]
    fn test_bring_up_sequence() {
        let mut iface = WifiInterface::new(FakeTransceiver::new());
        assert_eq!(iface.link_state(), LinkState::Idle);

        connect_default(&mut iface).unwrap();
        assert_eq!(iface.link_state(), LinkState::Connected);

        let ops = iface.driver().operations();
        assert_eq!(
            ops.as_slice(),
            &[
                Call::Startup(CLIENT_MODE),
                Call::Dhcp(true, DhcpMode::Station),
                Call::Connect("home".try_into().unwrap(), "hunter22".try_into().unwrap()),
                Call::IpAddress,
            ]
        );
        assert_eq!(
            iface.driver().timeout_for(|c| matches!(c, Call::Startup(_))),
            Some(15_000)
        );
    }

    #[test]
    fn test_startup_failure_stops_before_dhcp() {
        let mut fake = FakeTransceiver::new();
        fake.fail_startup = true;
        let mut iface = WifiInterface::new(fake);

        assert_eq!(connect_default(&mut iface), Err(NetworkError::DeviceError));
        assert_eq!(iface.driver().count(|c| matches!(c, Call::Dhcp(..))), 0);
        assert_eq!(iface.link_state(), LinkState::Idle);
    }

    #[test]
    fn test_dhcp_failure_stops_before_connect() {
        let mut fake = FakeTransceiver::new();
        fake.fail_dhcp = true;
        let mut iface = WifiInterface::new(fake);

        assert_eq!(connect_default(&mut iface), Err(NetworkError::DhcpFailure));
        assert_eq!(iface.driver().count(|c| matches!(c, Call::Connect(..))), 0);
        assert_eq!(iface.link_state(), LinkState::Idle);
    }

    #[test]
    fn test_association_failure_is_no_connection() {
        let mut fake = FakeTransceiver::new();
        fake.fail_connect = true;
        let mut iface = WifiInterface::new(fake);

        assert_eq!(connect_default(&mut iface), Err(NetworkError::NoConnection));
        assert_eq!(iface.driver().count(|c| matches!(c, Call::IpAddress)), 0);
    }

    #[test]
    fn test_missing_address_is_dhcp_failure() {
        let mut fake = FakeTransceiver::new();
        fake.no_address = true;
        let mut iface = WifiInterface::new(fake);

        assert_eq!(connect_default(&mut iface), Err(NetworkError::DhcpFailure));
        assert_eq!(iface.link_state(), LinkState::Idle);
    }

    #[test]
    fn test_channel_selection_unsupported() {
        let mut iface = WifiInterface::new(FakeTransceiver::new());
        let result = block_on(iface.connect("home", "pw", Security::Wpa2Psk, 6));
        assert_eq!(result, Err(NetworkError::Unsupported));
        assert!(iface.driver().calls.is_empty());
        assert_eq!(iface.credentials().ssid.as_str(), "");
    }

    #[test]
    fn test_disconnect_fails_open() {
        let mut fake = FakeTransceiver::new();
        fake.fail_disconnect = true;
        let mut iface = WifiInterface::new(fake);
        connect_default(&mut iface).unwrap();

        assert_eq!(block_on(iface.disconnect()), Err(NetworkError::DeviceError));
        assert_eq!(iface.link_state(), LinkState::Disconnected);
        assert_eq!(
            iface.driver().timeout_for(|c| matches!(c, Call::Disconnect)),
            Some(500)
        );
    }

    #[test]
    fn test_scan_starts_transceiver_first() {
        let fake = FakeTransceiver::with_access_points(&[([1, 2, 3, 4, 5, 6], -50)]);
        let mut iface = WifiInterface::new(fake);
        let mut results: [AccessPoint; 3] = Default::default();

        assert_eq!(block_on(iface.scan(&mut results)), Ok(1));
        assert_eq!(results[0].bssid, MacAddress([1, 2, 3, 4, 5, 6]));
        assert_eq!(
            iface.driver().operations().as_slice(),
            &[Call::Startup(CLIENT_MODE), Call::Scan(3)]
        );
    }

    #[test]
    fn test_scan_drops_link() {
        let fake = FakeTransceiver::with_access_points(&[([1, 2, 3, 4, 5, 6], -50)]);
        let mut iface = WifiInterface::new(fake);
        connect_default(&mut iface).unwrap();
        let epoch = iface.epoch;

        let mut results: [AccessPoint; 3] = Default::default();
        block_on(iface.scan(&mut results)).unwrap();
        assert_eq!(iface.link_state(), LinkState::Idle);
        assert_ne!(iface.epoch, epoch);

        connect_default(&mut iface).unwrap();
        assert_eq!(iface.link_state(), LinkState::Connected);
    }

    #[test]
    fn test_scan_rejects_overreported_count() {
        let mut fake = FakeTransceiver::new();
        fake.scan_count_override = Some(7);
        let mut iface = WifiInterface::new(fake);
        let mut results: [AccessPoint; 3] = Default::default();

        assert_eq!(
            block_on(iface.scan(&mut results)),
            Err(NetworkError::DeviceError)
        );
    }

    #[test]
    fn test_queries_forward_to_driver() {
        let mut iface = WifiInterface::new(FakeTransceiver::new());
        assert_eq!(
            block_on(iface.gateway()),
            Some(Ipv4Addr::new(192, 168, 1, 1))
        );
        assert_eq!(
            block_on(iface.netmask()),
            Some(Ipv4Addr::new(255, 255, 255, 0))
        );
        assert_eq!(block_on(iface.rssi()), -61);
        assert!(block_on(iface.mac_address()).is_some());
    }
}
