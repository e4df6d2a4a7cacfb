use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

/// Crate-level error type. The orchestrator converts every variant into a
/// displayable reply before anything reaches the UI.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure taxonomy for a single remote call. Timeout, transient server
/// errors, and network-level errors are retry-worthy; a terminal status
/// indicates a request that retrying cannot fix.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("transient server error (status {status})")]
    Transient { status: u16 },

    #[error("terminal client error (status {status})")]
    Terminal { status: u16 },

    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Transient { .. } | FetchError::Network(_) => true,
            FetchError::Terminal { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_is_not_retryable() {
        assert!(!FetchError::Terminal { status: 400 }.is_retryable());
        assert!(FetchError::Timeout.is_retryable());
        assert!(FetchError::Transient { status: 503 }.is_retryable());
        assert!(FetchError::Network("connection refused".into()).is_retryable());
    }
}
