//! Scripted transceiver fake for unit tests

// Call payloads are only compared whole in assertions
#![allow(dead_code)]

use core::net::Ipv4Addr;

use embassy_time::Duration;
use heapless::{String, Vec};
use wifi_hal_abstractions::{
    AccessPoint, DhcpMode, MacAddress, Protocol, Security, SocketId, Transceiver, WifiMode,
};

/// One facade call, in the order it was issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetTimeout(u64),
    Startup(WifiMode),
    Dhcp(bool, DhcpMode),
    Connect(String<32>, String<64>),
    Disconnect,
    IpAddress,
    Scan(usize),
    Open(Protocol, SocketId, String<32>, u16),
    Close(SocketId),
    Send(SocketId, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeError;

#[derive(Default)]
pub struct FakeTransceiver {
    pub calls: Vec<Call, 64>,
    pub sent: Vec<u8, 512>,
    pub fail_startup: bool,
    pub fail_dhcp: bool,
    pub fail_connect: bool,
    pub no_address: bool,
    pub fail_disconnect: bool,
    pub fail_open: bool,
    pub fail_close: bool,
    pub fail_send: bool,
    pub fail_scan: bool,
    pub scan_results: Vec<AccessPoint, 8>,
    /// Count reported by `scan` instead of the number of entries written
    pub scan_count_override: Option<usize>,
}

impl FakeTransceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_points(aps: &[([u8; 6], i8)]) -> Self {
        let mut fake = Self::new();
        for (bssid, rssi) in aps {
            let ap = AccessPoint {
                bssid: MacAddress(*bssid),
                rssi: *rssi,
                security: Security::Wpa2Psk,
                channel: 6,
                ..Default::default()
            };
            fake.scan_results.push(ap).unwrap();
        }
        fake
    }

    fn record(&mut self, call: Call) {
        self.calls.push(call).unwrap();
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Calls with timeout changes filtered out
    pub fn operations(&self) -> Vec<Call, 64> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, Call::SetTimeout(_)))
            .cloned()
            .collect()
    }

    /// Timeout in effect when the first call matching `pred` was issued
    pub fn timeout_for(&self, pred: impl Fn(&Call) -> bool) -> Option<u64> {
        let mut current = None;
        for call in &self.calls {
            if let Call::SetTimeout(ms) = call {
                current = Some(*ms);
            } else if pred(call) {
                return current;
            }
        }
        None
    }
}

fn outcome(fail: bool) -> Result<(), FakeError> {
    if fail {
        Err(FakeError)
    } else {
        Ok(())
    }
}

pub fn host(s: &str) -> String<32> {
    String::try_from(s).unwrap()
}

impl Transceiver for FakeTransceiver {
    type Error = FakeError;

    fn set_timeout(&mut self, timeout: Duration) {
        self.record(Call::SetTimeout(timeout.as_millis()));
    }

    async fn startup(&mut self, mode: WifiMode) -> Result<(), FakeError> {
        self.record(Call::Startup(mode));
        outcome(self.fail_startup)
    }

    async fn dhcp(&mut self, enabled: bool, mode: DhcpMode) -> Result<(), FakeError> {
        self.record(Call::Dhcp(enabled, mode));
        outcome(self.fail_dhcp)
    }

    async fn connect(&mut self, ssid: &str, passphrase: &str) -> Result<(), FakeError> {
        self.record(Call::Connect(
            String::try_from(ssid).unwrap(),
            String::try_from(passphrase).unwrap(),
        ));
        outcome(self.fail_connect)
    }

    async fn disconnect(&mut self) -> Result<(), FakeError> {
        self.record(Call::Disconnect);
        outcome(self.fail_disconnect)
    }

    async fn ip_address(&mut self) -> Option<Ipv4Addr> {
        self.record(Call::IpAddress);
        (!self.no_address).then(|| Ipv4Addr::new(192, 168, 1, 50))
    }

    async fn mac_address(&mut self) -> Option<MacAddress> {
        Some(MacAddress([0x5c, 0xcf, 0x7f, 0x01, 0x02, 0x03]))
    }

    async fn gateway(&mut self) -> Option<Ipv4Addr> {
        Some(Ipv4Addr::new(192, 168, 1, 1))
    }

    async fn netmask(&mut self) -> Option<Ipv4Addr> {
        Some(Ipv4Addr::new(255, 255, 255, 0))
    }

    async fn rssi(&mut self) -> i8 {
        -61
    }

    async fn scan(&mut self, results: &mut [AccessPoint]) -> Result<usize, FakeError> {
        self.record(Call::Scan(results.len()));
        outcome(self.fail_scan)?;
        let written = self.scan_results.len().min(results.len());
        for (slot, ap) in results.iter_mut().zip(self.scan_results.iter()) {
            *slot = ap.clone();
        }
        Ok(self.scan_count_override.unwrap_or(written))
    }

    async fn open(
        &mut self,
        protocol: Protocol,
        id: SocketId,
        host: &str,
        port: u16,
    ) -> Result<(), FakeError> {
        self.record(Call::Open(protocol, id, String::try_from(host).unwrap(), port));
        outcome(self.fail_open)
    }

    async fn close(&mut self, id: SocketId) -> Result<(), FakeError> {
        self.record(Call::Close(id));
        outcome(self.fail_close)
    }

    async fn send(&mut self, id: SocketId, data: &[u8]) -> Result<(), FakeError> {
        self.record(Call::Send(id, data.len()));
        outcome(self.fail_send)?;
        self.sent.extend_from_slice(data).unwrap();
        Ok(())
    }
}
