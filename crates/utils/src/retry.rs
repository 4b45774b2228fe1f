//! Bounded retry for transient chain failures (spec.md §4.1: "every Gateway
//! call is wrapped by the caller in a bounded retry (default 3 attempts)
//! for `TransientChainError`").

use std::future::Future;

use tracing::warn;

/// Default attempt count named in spec.md §4.1.
pub const DEFAULT_ATTEMPTS: usize = 3;

/// Calls `f` up to `attempts` times, short-circuiting on the first
/// non-retryable error (as classified by `is_transient`). Returns the last
/// error if every attempt was retryable and still failed.
pub async fn retry_transient<F, Fut, T, E>(attempts: usize, mut f: F, is_transient: impl Fn(&E) -> bool) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>
{
    debug_assert!(attempts >= 1);
    let mut last_err = None;

    for attempt in 1..=attempts.max(1) {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts && is_transient(&err) => {
                warn!(attempt, attempts, "transient chain call failure, retrying");
                last_err = Some(err);
            }
            Err(err) => return Err(err)
        }
    }

    // Unreachable unless attempts == 0, guarded above, but keep the compiler
    // happy without an `unwrap`.
    Err(last_err.expect("loop always returns Ok or Err before falling through"))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicUsize::new(0);
        let result: Result<&'static str, &'static str> = retry_transient(
            3,
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n < 2 { Err("transient") } else { Ok("ok") } }
            },
            |_| true
        )
        .await;
        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_transient_errors() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), &'static str> = retry_transient(
            3,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("fatal") }
            },
            |_| false
        )
        .await;
        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), &'static str> = retry_transient(
            3,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("still transient") }
            },
            |_| true
        )
        .await;
        assert_eq!(result, Err("still transient"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
