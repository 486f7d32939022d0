//! Geolocation report encoding
//!
//! Produces the JSON document the geolocation service expects:
//!
//! ```text
//! {"values":[{"key":"ssid0","value":"00:25:9c:cf:1c:ac"},{"key":"rssi0","value":-43}, ...]}
//! ```
//!
//! Each access point contributes one `ssid{i}` entry holding its BSSID and one
//! `rssi{i}` entry holding its signal strength, in scan order.

use core::fmt::Write;

use heapless::String;
use wifi_hal_abstractions::AccessPoint;

use crate::network::ReportError;

/// Encode `access_points` into `out`, replacing its contents
///
/// # Errors
///
/// Returns `ReportError::PayloadOverflow` if the document does not fit.
pub fn encode_access_points<const N: usize>(
    out: &mut String<N>,
    access_points: &[AccessPoint],
) -> Result<(), ReportError> {
    out.clear();
    write_document(out, access_points).map_err(|_| ReportError::PayloadOverflow)
}

fn write_document<W: Write>(out: &mut W, access_points: &[AccessPoint]) -> core::fmt::Result {
    out.write_str("{\"values\":[")?;
    for (i, ap) in access_points.iter().enumerate() {
        if i > 0 {
            out.write_char(',')?;
        }
        write!(out, "{{\"key\":\"ssid{}\",\"value\":\"{}\"}},", i, ap.bssid)?;
        write!(out, "{{\"key\":\"rssi{}\",\"value\":{}}}", i, ap.rssi)?;
    }
    out.write_str("]}")
}
