//! Batched fetch scheduling
//!
//! Runs a list of asynchronous tasks in sequential chunks of a fixed
//! size: every task in a chunk is polled concurrently, and the next chunk
//! only starts once the previous one has fully settled. Peak concurrency
//! is bounded by the chunk size at the cost of head-of-line blocking
//! between chunks; for best-effort prefetch that tradeoff is fine.

use std::future::Future;

/// Run `tasks` in sequential chunks of at most `concurrency`.
///
/// Individual task failures are logged and discarded; a failing task
/// never cancels its chunk siblings and never fails the batch. With a
/// `concurrency` of zero the whole list runs as a single chunk.
pub async fn run_batched<F, E>(tasks: Vec<F>, concurrency: usize)
where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let total = tasks.len();
    let chunk_size = if concurrency == 0 { total.max(1) } else { concurrency };

    let mut tasks = tasks;
    let mut done = 0usize;
    while !tasks.is_empty() {
        let take = chunk_size.min(tasks.len());
        let chunk: Vec<F> = tasks.drain(..take).collect();
        let results = futures::future::join_all(chunk).await;
        done += results.len();
        for result in results {
            if let Err(e) = result {
                tracing::debug!("Prefetch task failed: {}", e);
            }
        }
        tracing::trace!("Batch progress: {}/{}", done, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Tracks how many instrumented tasks are suspended at once.
    #[derive(Default)]
    struct InFlight {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl InFlight {
        fn enter(&self) {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
        }

        fn leave(&self) {
            self.current.fetch_sub(1, Ordering::SeqCst);
        }
    }

    async fn stub_task(gauge: Arc<InFlight>, fail: bool) -> Result<(), String> {
        gauge.enter();
        tokio::time::sleep(Duration::from_millis(5)).await;
        gauge.leave();
        if fail {
            Err("simulated fetch failure".to_string())
        } else {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_bound() {
        let gauge = Arc::new(InFlight::default());
        let tasks: Vec<_> = (0..25).map(|_| stub_task(gauge.clone(), false)).collect();

        run_batched(tasks, 10).await;

        assert!(gauge.peak.load(Ordering::SeqCst) <= 10);
        assert_eq!(gauge.current.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_full_chunks_run_concurrently() {
        let gauge = Arc::new(InFlight::default());
        let tasks: Vec<_> = (0..10).map(|_| stub_task(gauge.clone(), false)).collect();

        run_batched(tasks, 10).await;

        assert_eq!(gauge.peak.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_failures_do_not_cancel_siblings_or_later_chunks() {
        let completed = Arc::new(AtomicUsize::new(0));
        let tasks: Vec<_> = (0..7)
            .map(|i| {
                let completed = completed.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    completed.fetch_add(1, Ordering::SeqCst);
                    if i % 2 == 0 {
                        Err("boom".to_string())
                    } else {
                        Ok(())
                    }
                }
            })
            .collect();

        run_batched(tasks, 3).await;

        assert_eq!(completed.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_empty_task_list_is_a_no_op() {
        run_batched(Vec::<futures::future::Ready<Result<(), String>>>::new(), 10).await;
    }
}
