//! Bounded, order-preserving concurrent execution.
//!
//! The batch coordinator needs to run many per-domain pipelines at once
//! without unbounded resource use, and must hand results back in input order
//! even though completion order is arbitrary. This module provides that
//! fan-out: a semaphore-gated stream of futures whose completions land in
//! index-tagged slots, so no sorting pass is needed afterwards.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tracing::debug;

/// Run `op` over every item with at most `concurrency` in flight.
///
/// Results are returned in input order regardless of completion order.
/// A `concurrency` of zero is treated as one. The operation itself is
/// infallible; fallible work should surface failures in its output type.
pub(crate) async fn run_bounded<T, R, F, Fut>(items: Vec<T>, concurrency: usize, op: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: std::future::Future<Output = R>,
{
    let concurrency = concurrency.max(1);
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(concurrency));

    debug!(total, concurrency, "starting bounded fan-out");

    let op = &op;
    let mut slots: Vec<Option<R>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);

    let mut completions = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| {
            let semaphore = semaphore.clone();
            async move {
                // The semaphore is owned by this call and never closed.
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("admission semaphore closed");
                (index, op(item).await)
            }
        })
        .buffer_unordered(concurrency);

    while let Some((index, result)) = completions.next().await {
        slots[index] = Some(result);
    }
    drop(completions);

    // Every admitted future completes exactly once, so every slot is filled.
    debug_assert!(slots.iter().all(Option::is_some));
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_results_preserve_input_order() {
        // Later items finish first; output order must still match input.
        let items: Vec<usize> = (0..6).collect();
        let results = run_bounded(items, 6, |i| async move {
            sleep(Duration::from_millis((6 - i as u64) * 20)).await;
            i * 10
        })
        .await;

        assert_eq!(results, vec![0, 10, 20, 30, 40, 50]);
    }

    #[tokio::test]
    async fn test_concurrency_limit_is_respected() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let items: Vec<usize> = (0..12).collect();
        let results = run_bounded(items, 3, |i| {
            let active = active.clone();
            let peak = peak.clone();
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(25)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                i
            }
        })
        .await;

        assert_eq!(results.len(), 12);
        assert!(
            peak.load(Ordering::SeqCst) <= 3,
            "observed {} tasks in flight with a limit of 3",
            peak.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped() {
        let results = run_bounded(vec![1, 2, 3], 0, |i| async move { i + 1 }).await;
        assert_eq!(results, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_output() {
        let results = run_bounded(Vec::<u32>::new(), 4, |i| async move { i }).await;
        assert!(results.is_empty());
    }
}
