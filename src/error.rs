use thiserror::Error;

/// Balance walker error types
#[derive(Error, Debug)]
pub enum WalkerError {
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Sink failed for {target}: {reason}")]
    SinkFailed { target: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for pipeline and sink operations
pub type WalkerResult<T> = Result<T, WalkerError>;

impl WalkerError {
    pub fn sink(target: impl Into<String>, reason: impl Into<String>) -> Self {
        WalkerError::SinkFailed {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Errors that only affect the current tick; the loop keeps running.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WalkerError::DeviceUnavailable(_) | WalkerError::SinkFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(WalkerError::DeviceUnavailable("gone".into()).is_transient());
        assert!(WalkerError::sink("Jump", "driver missing").is_transient());
        assert!(!WalkerError::InvalidConfig("bad".into()).is_transient());
    }

    #[test]
    fn test_sink_message() {
        let err = WalkerError::sink("Forward", "queue full");
        assert_eq!(err.to_string(), "Sink failed for Forward: queue full");
    }
}
