use thiserror::Error;

/// Messaging error types covering topology, publish, and consume failures.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// Underlying AMQP client error
    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    /// Envelope could not be serialized to the wire format
    #[error("Failed to serialize envelope: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Publish did not complete within the configured deadline
    #[error("Publish to exchange '{exchange}' timed out after {timeout_ms}ms")]
    PublishTimeout { exchange: String, timeout_ms: u64 },

    /// Publish or bind referenced an exchange that was never declared
    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),

    /// Consume or bind referenced a queue that does not exist
    #[error("Unknown queue: {0}")]
    UnknownQueue(String),

    /// Transport-level failure outside the AMQP client
    #[error("Transport failure: {0}")]
    Transport(String),
}

/// Type alias for Result with MessagingError
pub type MessagingResult<T> = Result<T, MessagingError>;
