use std::future::Future;

use tracing::warn;

use crate::session::SessionError;

/// Retry attempts allowed under sustained rate limiting before the
/// operation is given up.
pub const DEFAULT_RATE_LIMIT_MAX_RETRIES: usize = 5;

/// Bounds for the transient-fault retry wrapper.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_rate_limit_retries: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: DEFAULT_RATE_LIMIT_MAX_RETRIES,
        }
    }
}

/// Run `request`, honoring remote-dictated rate-limit waits.
///
/// The wait duration comes from the remote verbatim, with no jitter and
/// no cap.
/// The retry counter bounds the loop so a remote that rate-limits forever
/// cannot hang the task. Every other error class returns immediately;
/// stale-reference refresh is a pipeline concern because it re-runs the
/// lookup, not this call.
pub async fn with_rate_limit_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut request: F,
) -> Result<T, SessionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SessionError>>,
{
    let mut retries = 0usize;

    loop {
        match request().await {
            Ok(value) => return Ok(value),
            Err(SessionError::RateLimited { wait }) => {
                if retries >= policy.max_rate_limit_retries {
                    warn!(
                        operation,
                        retries,
                        max_retries = policy.max_rate_limit_retries,
                        wait_secs = wait.as_secs(),
                        "rate limit persisted after retries"
                    );
                    return Err(SessionError::RateLimited { wait });
                }

                retries += 1;
                warn!(
                    operation,
                    retries,
                    max_retries = policy.max_rate_limit_retries,
                    wait_millis = wait.as_millis() as u64,
                    "rate limited, waiting before retry"
                );
                tokio::time::sleep(wait).await;
            },
            Err(err) => return Err(err),
        }
    }
}
