use thiserror::Error;

/// Failures reported by a byte source.
///
/// The framer and decoder never produce these themselves; they only pass them
/// through to the consumer, which ends the session.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("unable to wake up the station: {0}")]
    Wakeup(#[source] std::io::Error),

    #[error("max retries ({0}) exceeded while fetching reports")]
    RetriesExceeded(u32),

    #[error("transport IO: {0}")]
    Io(#[from] std::io::Error),
}
