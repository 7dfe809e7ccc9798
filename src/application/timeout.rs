//! # Global Timeout Guard
//!
//! An outer deadline applied to every tool invocation. Each call gets its own
//! timer, so concurrent invocations never interfere. On expiry the inner
//! future is dropped, which kills any process it spawned and removes its
//! temp files; the timer itself is released on every exit path.

use std::future::Future;
use std::time::Duration;

use crate::domain::error::ToolError;

/// Result of running an operation under a deadline.
#[derive(Debug, PartialEq)]
pub enum Deadline<T> {
    Completed(T),
    TimedOut,
}

#[derive(Debug, Clone, Copy)]
pub struct GlobalTimeoutGuard {
    limit: Duration,
}

impl GlobalTimeoutGuard {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub async fn run<F: Future>(&self, operation: F) -> Deadline<F::Output> {
        match tokio::time::timeout(self.limit, operation).await {
            Ok(output) => Deadline::Completed(output),
            Err(_) => Deadline::TimedOut,
        }
    }

    /// Like [`run`](Self::run), folding expiry into `ToolError::GlobalTimeout`,
    /// which dominates whatever the inner operation would have returned.
    pub async fn guard<T, F>(&self, operation: F) -> Result<T, ToolError>
    where
        F: Future<Output = Result<T, ToolError>>,
    {
        match self.run(operation).await {
            Deadline::Completed(result) => result,
            Deadline::TimedOut => {
                tracing::error!(
                    "Global timeout ({}s) reached",
                    self.limit.as_secs()
                );
                Err(ToolError::GlobalTimeout(self.limit.as_secs()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let guard = GlobalTimeoutGuard::new(Duration::from_secs(1));
        assert_eq!(guard.run(async { 7 }).await, Deadline::Completed(7));
    }

    #[tokio::test]
    async fn test_times_out() {
        let guard = GlobalTimeoutGuard::new(Duration::from_millis(50));
        let outcome = guard
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert_eq!(outcome, Deadline::TimedOut);
    }

    #[tokio::test]
    async fn test_outer_dominates_inner_timeout() {
        let guard = GlobalTimeoutGuard::new(Duration::from_millis(100));
        let inner = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Err::<(), _>(ToolError::ExecutionTimeout {
                subject: "Execution",
                secs: 10,
            })
        };
        let err = guard.guard(inner).await.unwrap_err();
        assert!(matches!(err, ToolError::GlobalTimeout(_)));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let guard = GlobalTimeoutGuard::new(Duration::from_secs(1));
        let err = guard
            .guard(async { Err::<(), _>(ToolError::validation("bad input")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "bad input");
    }

    #[tokio::test]
    async fn test_expiry_drops_inner_operation() {
        struct SetOnDrop(Arc<AtomicBool>);
        impl Drop for SetOnDrop {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let flag = SetOnDrop(dropped.clone());
        let guard = GlobalTimeoutGuard::new(Duration::from_millis(50));
        let outcome = guard
            .run(async move {
                let _flag = flag;
                tokio::time::sleep(Duration::from_secs(5)).await;
            })
            .await;

        assert_eq!(outcome, Deadline::TimedOut);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_concurrent_deadlines_are_independent() {
        let short = GlobalTimeoutGuard::new(Duration::from_millis(50));
        let long = GlobalTimeoutGuard::new(Duration::from_secs(2));

        let (a, b) = tokio::join!(
            short.run(tokio::time::sleep(Duration::from_millis(300))),
            long.run(async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                "done"
            }),
        );
        assert_eq!(a, Deadline::TimedOut);
        assert_eq!(b, Deadline::Completed("done"));
    }
}
