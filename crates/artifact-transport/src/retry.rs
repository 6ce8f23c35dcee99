//! Bounded retry with exponential backoff for remote calls.

use std::future::Future;

use sui_artifact_types::{ArtifactError, RetryConfig};

/// Whether an error looks like a transient network condition worth retrying:
/// rate limiting, timeouts, or connection-level failures.
pub fn is_transient_error(error: &anyhow::Error) -> bool {
    let s = format!("{:#}", error).to_ascii_lowercase();
    s.contains("429")
        || s.contains("too many")
        || s.contains("timed out")
        || s.contains("timeout")
        || s.contains("connection")
        || s.contains("transport")
        || s.contains("temporarily unavailable")
}

/// Run `op` until it succeeds, the retry budget is spent, or it fails with a
/// non-transient error.
///
/// Transient failures surface as
/// [`ArtifactError::RpcTransient`] carrying the attempt count and the last
/// underlying cause. A non-transient failure that is already an
/// [`ArtifactError`] passes through unchanged.
pub async fn with_retries<T, F, Fut>(retry: &RetryConfig, mut op: F) -> Result<T, ArtifactError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut attempts = 0usize;
    let mut backoff = retry.initial_backoff;

    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                attempts += 1;
                if attempts > retry.retries || !is_transient_error(&e) {
                    return Err(match e.downcast::<ArtifactError>() {
                        Ok(typed) => typed,
                        Err(raw) => ArtifactError::RpcTransient {
                            attempts,
                            source: raw,
                        },
                    });
                }
                tracing::debug!(attempts, ?backoff, "transient rpc failure, retrying");
                tokio::time::sleep(backoff).await;
                backoff = std::cmp::min(backoff * 2, retry.max_backoff);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_is_transient_error() {
        assert!(is_transient_error(&anyhow::anyhow!("request timed out")));
        assert!(is_transient_error(&anyhow::anyhow!("Request rejected `429`")));
        assert!(is_transient_error(&anyhow::anyhow!("connection reset by peer")));
        assert!(!is_transient_error(&anyhow::anyhow!("object query error: notExists")));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicUsize::new(0);
        let retry = RetryConfig::new(3, 1, 5);

        let result: Result<u32, _> = with_retries(&retry, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(anyhow::anyhow!("connection refused"))
                } else {
                    Ok(7u32)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_reports_attempts() {
        let retry = RetryConfig::new(2, 1, 2);
        let result: Result<(), _> =
            with_retries(&retry, || async { Err(anyhow::anyhow!("timed out")) }).await;

        match result.unwrap_err() {
            ArtifactError::RpcTransient { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(source.to_string().contains("timed out"));
            }
            other => panic!("expected RpcTransient, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_transient_fails_fast() {
        let calls = AtomicUsize::new(0);
        let retry = RetryConfig::new(5, 1, 2);
        let result: Result<(), _> = with_retries(&retry, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow::anyhow!("invalid params")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_typed_errors_pass_through() {
        let retry = RetryConfig::new(2, 1, 2);
        let result: Result<(), _> = with_retries(&retry, || async {
            Err(anyhow::Error::new(ArtifactError::malformed("bad owner")))
        })
        .await;

        match result.unwrap_err() {
            ArtifactError::MalformedResponse { reason } => assert_eq!(reason, "bad owner"),
            other => panic!("expected MalformedResponse, got {other}"),
        }
    }
}
