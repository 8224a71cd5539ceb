use thiserror::Error;

/// Failure classes for a single sync invocation.
///
/// The worker loop maps each class to a queue disposition: retryable
/// errors are rejected with requeue so broker redelivery retries the same
/// offset, everything else is dead-lettered and acknowledged.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Inbound message payload is not JSON, or the offset field is
    /// missing or non-numeric. Discarded to the failed queue.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Ad-hoc record id does not exist in the catalog.
    #[error("catalog record not found: {0}")]
    NotFound(String),

    /// Catalog or storefront API could not be reached, rejected auth, or
    /// returned a server error.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Storefront API throttled the request.
    #[error("rate limited by storefront API")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Payload rejected by the transform or by the storefront API.
    #[error("payload rejected: {0}")]
    Validation(String),

    /// Successor offset could not be published. Without redelivery the
    /// chain halts here, so this must be surfaced loudly.
    #[error("failed to publish successor offset: {0}")]
    Publish(String),
}

impl SyncError {
    /// True when broker redelivery of the same offset may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::UpstreamUnavailable(_)
                | SyncError::RateLimited { .. }
                | SyncError::Publish(_)
        )
    }
}
