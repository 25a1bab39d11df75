//! Network error types.

use std::sync::Arc;

/// Errors raised before a response arrives.
///
/// A response with a non-2xx status is not an error at this layer; only
/// transport failures are.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    /// The request could not be built (bad method, header or URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// The host reports no connectivity.
    #[error("network unreachable")]
    Offline,

    /// Transport error from the HTTP client.
    #[error("network error: {0}")]
    Transport(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { NetworkError::Timeout } else { NetworkError::Transport(Arc::new(err)) }
    }
}

impl From<NetworkError> for swcache_core::Error {
    fn from(err: NetworkError) -> Self {
        swcache_core::Error::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(NetworkError::Offline.to_string(), "network unreachable");
        assert!(NetworkError::InvalidRequest("bad method".into()).to_string().contains("bad method"));
    }

    #[test]
    fn test_into_core_error() {
        let err: swcache_core::Error = NetworkError::Timeout.into();
        assert_eq!(err.to_string(), "NETWORK_ERROR: request timeout");
    }
}
