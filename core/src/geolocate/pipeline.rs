//! Outbound report pipeline
//!
//! Several producers (sensor readings, geolocation) share one request builder.
//! A mutex gate keeps at most one request under construction: [`ReportPipeline::begin`]
//! takes the gate, [`PendingRequest::post`] hands the finished request to the
//! transmission task's channel and only then releases it. Dropping a
//! `PendingRequest` without posting releases the gate as well.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Channel, Receiver};
use embassy_sync::mutex::{Mutex, MutexGuard};
use heapless::String;

use crate::network::ReportError;

/// Longest request URI
pub const MAX_URI_LEN: usize = 64;

/// Largest encoded payload
pub const MAX_PAYLOAD_LEN: usize = 256;

/// A finished request waiting for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutboundRequest {
    pub uri: String<MAX_URI_LEN>,
    pub payload: String<MAX_PAYLOAD_LEN>,
}

impl OutboundRequest {
    pub const fn new() -> Self {
        Self {
            uri: String::new(),
            payload: String::new(),
        }
    }
}

impl Default for OutboundRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared request builder plus the outbox drained by the transmission task
///
/// Usually placed in a `static` with `CriticalSectionRawMutex` so any task can
/// submit reports.
pub struct ReportPipeline<M: RawMutex, const DEPTH: usize> {
    builder: Mutex<M, OutboundRequest>,
    outbox: Channel<M, OutboundRequest, DEPTH>,
}

impl<M: RawMutex, const DEPTH: usize> ReportPipeline<M, DEPTH> {
    pub const fn new() -> Self {
        Self {
            builder: Mutex::new(OutboundRequest::new()),
            outbox: Channel::new(),
        }
    }

    /// Take the gate and start a request for `uri`
    ///
    /// Waits while another request is under construction.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::RequestInit` if `uri` does not fit; the gate is
    /// released again before returning.
    pub async fn begin(&self, uri: &str) -> Result<PendingRequest<'_, M, DEPTH>, ReportError> {
        let mut request = self.builder.lock().await;
        request.uri.clear();
        request.payload.clear();
        request.uri.push_str(uri).map_err(|_| {
            warn!("Request URI too long ({} bytes)", uri.len());
            ReportError::RequestInit
        })?;
        trace!("Request started for {}", uri);
        Ok(PendingRequest {
            request,
            outbox: &self.outbox,
        })
    }

    /// True while a request is under construction
    pub fn is_busy(&self) -> bool {
        self.builder.try_lock().is_err()
    }

    /// Receiver end for the transmission task
    pub fn receiver(&self) -> Receiver<'_, M, OutboundRequest, DEPTH> {
        self.outbox.receiver()
    }

    /// Take the next queued request without waiting
    pub fn try_next(&self) -> Option<OutboundRequest> {
        self.outbox.try_receive().ok()
    }
}

impl<M: RawMutex, const DEPTH: usize> Default for ReportPipeline<M, DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

/// A request under construction; holds the pipeline gate
pub struct PendingRequest<'a, M: RawMutex, const DEPTH: usize> {
    request: MutexGuard<'a, M, OutboundRequest>,
    outbox: &'a Channel<M, OutboundRequest, DEPTH>,
}

impl<M: RawMutex, const DEPTH: usize> PendingRequest<'_, M, DEPTH> {
    pub fn uri(&self) -> &str {
        &self.request.uri
    }

    /// Payload buffer to encode the request body into
    pub fn payload_mut(&mut self) -> &mut String<MAX_PAYLOAD_LEN> {
        &mut self.request.payload
    }

    /// Queue the request for transmission, then release the gate
    pub async fn post(self) {
        self.outbox.send(self.request.clone()).await;
        debug!(
            "Queued {} byte request for {}",
            self.request.payload.len(),
            self.request.uri.as_str()
        );
    }
}
