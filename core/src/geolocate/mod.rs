//! WiFi geolocation reporting
//!
//! Scans for nearby access points and submits the BSSID and signal strength
//! of the first few to a geolocation service through the report pipeline.
//!
//! Note: the report reveals the device's surroundings to whoever receives it.
//!
//! # Example
//!
//! ```ignore
//! static REPORTS: ReportPipeline<CriticalSectionRawMutex, 4> = ReportPipeline::new();
//!
//! let mut reporter = GeolocationReporter::new(&REPORTS, "/v2/things/TOKEN");
//! let sent = reporter.run(&mut iface).await?;
//! ```

pub mod pipeline;
pub mod report;

use embassy_sync::blocking_mutex::raw::RawMutex;
use wifi_hal_abstractions::{AccessPoint, Transceiver};

use crate::network::{NetworkClient, ReportError, WifiInterface};

pub use pipeline::{OutboundRequest, PendingRequest, ReportPipeline, MAX_PAYLOAD_LEN, MAX_URI_LEN};
pub use report::encode_access_points;

/// Scan at most this many access points
pub const MAX_WIFI_AP: usize = 3;

/// Scan for access points and submit a geolocation report to `uri`
///
/// The pipeline gate is held from the start of the request until it is
/// queued, and released on every failure path. Returns the number of access
/// points reported (1 to [`MAX_WIFI_AP`]).
///
/// # Errors
///
/// * `ReportError::RequestInit` - the request could not be started
/// * `ReportError::Network` - the transceiver failed to start or scan
/// * `ReportError::NoAccessPoints` - the scan found nothing; nothing is sent
/// * `ReportError::PayloadOverflow` - the report did not fit the payload buffer
pub async fn geolocate<T, M, const DEPTH: usize>(
    iface: &mut WifiInterface<T>,
    pipeline: &ReportPipeline<M, DEPTH>,
    uri: &str,
) -> Result<usize, ReportError>
where
    T: Transceiver,
    M: RawMutex,
{
    let mut request = pipeline.begin(uri).await?;

    let mut access_points: [AccessPoint; MAX_WIFI_AP] = Default::default();
    let count = iface.scan(&mut access_points).await?;
    if count == 0 {
        warn!("No WiFi access points found, skipping geolocation");
        return Err(ReportError::NoAccessPoints);
    }
    for (i, ap) in access_points[..count].iter().enumerate() {
        debug!("AP {}: {} rssi {}", i, ap.ssid.as_str(), ap.rssi);
    }

    encode_access_points(request.payload_mut(), &access_points[..count])?;
    request.post().await;
    info!("Sent {} WiFi access points", count);
    Ok(count)
}

/// Geolocation reporter bound to a pipeline and service URI
pub struct GeolocationReporter<'p, M: RawMutex, const DEPTH: usize> {
    pipeline: &'p ReportPipeline<M, DEPTH>,
    uri: &'p str,
}

impl<'p, M: RawMutex, const DEPTH: usize> GeolocationReporter<'p, M, DEPTH> {
    pub fn new(pipeline: &'p ReportPipeline<M, DEPTH>, uri: &'p str) -> Self {
        Self { pipeline, uri }
    }
}

impl<T, M, const DEPTH: usize> NetworkClient<T> for GeolocationReporter<'_, M, DEPTH>
where
    T: Transceiver,
    M: RawMutex,
{
    type Output = usize;
    type Error = ReportError;

    async fn run(&mut self, iface: &mut WifiInterface<T>) -> Result<usize, ReportError> {
        geolocate(iface, self.pipeline, self.uri).await
    }
}
