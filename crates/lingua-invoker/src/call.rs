//! Timeout-bounded calls.

use std::time::Duration;

use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::InvokeError;
use crate::retry::{RetryPolicy, retry};
use crate::transport::{Request, Response, Transport, TransportError};

/// Send one request, giving up after `timeout`.
///
/// On expiry the in-flight exchange is dropped, which closes its
/// connection; the deadline timer is released with it. A reply outside
/// 2xx becomes `InvokeError::Http` with the body preserved.
pub async fn call_with_timeout<T: Transport + ?Sized>(
    transport: &T,
    endpoint: &Endpoint,
    request: &Request,
    timeout: Duration,
) -> Result<Response, InvokeError> {
    let timeout = request.timeout.unwrap_or(timeout);
    match tokio::time::timeout(timeout, transport.send(endpoint, request)).await {
        Err(_) => {
            debug!(%endpoint, path = %request.path, ?timeout, "request timed out");
            Err(InvokeError::Timeout(timeout))
        }
        // The request itself could not be built; sending it again will not help.
        Ok(Err(e @ TransportError::Request(_))) => Err(InvokeError::Malformed(e.to_string())),
        Ok(Err(e)) => Err(InvokeError::Network(e.to_string())),
        Ok(Ok(resp)) if resp.is_success() => Ok(resp),
        Ok(Ok(resp)) => {
            debug!(%endpoint, path = %request.path, status = %resp.status, "non-2xx response");
            Err(InvokeError::Http {
                status: resp.status,
                body: resp.body,
            })
        }
    }
}

/// `call_with_timeout` against a fixed endpoint under a retry policy.
pub async fn call_with_retry<T: Transport + ?Sized>(
    transport: &T,
    endpoint: &Endpoint,
    request: &Request,
    timeout: Duration,
    policy: &RetryPolicy,
) -> Result<Response, InvokeError> {
    retry(policy, |_| call_with_timeout(transport, endpoint, request, timeout)).await
}
