//! Publish-subscribe feed client trait

use marquee_protocol::Publish;

/// Feed client failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedError {
    /// Network or broker connection dropped
    ConnectionLost,
    /// No response within the allowed time
    Timeout,
    /// Broker refused the session or subscription (reason code)
    Refused(u8),
    /// Malformed data on an otherwise healthy link
    Protocol,
}

impl FeedError {
    /// True if the session is gone and must be re-established
    pub fn is_transient(&self) -> bool {
        !matches!(self, FeedError::Protocol)
    }
}

/// Client for the message feed
#[allow(async_fn_in_trait)]
pub trait FeedClient {
    /// Establish the session and subscribe to `filter`
    async fn connect(&mut self, filter: &str) -> Result<(), FeedError>;

    /// Wait up to `timeout_ms` for the next message
    ///
    /// Returns `Ok(None)` if nothing arrived in time. Must not block longer
    /// than the timeout.
    async fn poll(&mut self, timeout_ms: u32) -> Result<Option<Publish>, FeedError>;
}
