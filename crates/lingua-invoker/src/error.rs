//! Invocation outcomes.

use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use lingua_core::CapabilityError;
use thiserror::Error;

pub type InvokeResult<T> = Result<T, InvokeError>;

/// Why an invocation did not produce a usable reply.
///
/// `Timeout` and `Network` are transient and retried; everything else is
/// terminal for the current operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvokeError {
    /// The connectivity signal is down; nothing was sent.
    #[error("offline")]
    Offline,

    /// Discovery found no candidate answering the liveness probe.
    #[error("no reachable endpoint")]
    NoEndpoint,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network failure: {0}")]
    Network(String),

    /// The server answered outside 2xx. Status and body are untouched.
    #[error("server responded with {status}")]
    Http { status: StatusCode, body: Bytes },

    /// 2xx, but the body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// 2xx, but the service reported an error in the body.
    #[error("service error: {0}")]
    Service(String),

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<InvokeError>,
    },
}

impl InvokeError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, InvokeError::Timeout(_) | InvokeError::Network(_))
    }

    /// The underlying failure, looking through `RetriesExhausted`.
    pub fn root_cause(&self) -> &InvokeError {
        match self {
            InvokeError::RetriesExhausted { last, .. } => last.root_cause(),
            other => other,
        }
    }

    /// A user-facing message naming the likely cause.
    pub fn status_message(&self) -> String {
        match self {
            InvokeError::Offline => "Offline — check network".to_string(),
            InvokeError::NoEndpoint => "Could not find running Python server".to_string(),
            InvokeError::Timeout(after) => {
                format!("Backend did not respond within {} ms", after.as_millis())
            }
            InvokeError::Network(_) => "Backend unreachable — is the translation server running?".to_string(),
            InvokeError::Http { status, .. } => format!("Backend responded with error ({status})"),
            InvokeError::Malformed(_) => "Backend sent a malformed reply".to_string(),
            InvokeError::Service(msg) => format!("Backend reported an error: {msg}"),
            InvokeError::RetriesExhausted { attempts, last } => {
                format!("{} (after {attempts} attempts)", last.status_message())
            }
        }
    }
}

impl From<InvokeError> for CapabilityError {
    fn from(err: InvokeError) -> Self {
        match err.root_cause() {
            InvokeError::Malformed(msg) | InvokeError::Service(msg) => {
                CapabilityError::Malformed(msg.clone())
            }
            _ => CapabilityError::Unavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_failures_retry() {
        assert!(InvokeError::Timeout(Duration::from_secs(5)).is_retryable());
        assert!(InvokeError::Network("refused".into()).is_retryable());
        assert!(!InvokeError::Offline.is_retryable());
        assert!(!InvokeError::NoEndpoint.is_retryable());
        assert!(!InvokeError::Malformed("x".into()).is_retryable());
        assert!(
            !InvokeError::Http {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: Bytes::new(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn root_cause_unwraps_exhaustion() {
        let err = InvokeError::RetriesExhausted {
            attempts: 3,
            last: Box::new(InvokeError::Network("connection refused".into())),
        };
        assert_eq!(err.root_cause(), &InvokeError::Network("connection refused".into()));
        assert!(err.to_string().contains("connection refused"));
        assert!(err.status_message().contains("after 3 attempts"));
    }

    #[test]
    fn capability_error_mapping() {
        let cap: CapabilityError = InvokeError::Malformed("no translatedText".into()).into();
        assert_eq!(cap, CapabilityError::Malformed("no translatedText".into()));

        let cap: CapabilityError = InvokeError::Offline.into();
        assert!(matches!(cap, CapabilityError::Unavailable(_)));
    }
}
