//! Bounded fan-out/fan-in executor. Runs a batch of futures behind a worker
//! cap and an overall deadline, returning whatever completed in time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};

/// Run all `tasks` with at most `max_workers` in flight at once.
///
/// Results are collected in completion order. When `overall_timeout` fires
/// the collected prefix is returned and still-running tasks are abandoned in
/// place; a task that panics simply contributes nothing. Callers needing an
/// order re-sort afterwards.
pub async fn run_all<T, F>(tasks: Vec<F>, max_workers: usize, overall_timeout: Duration) -> Vec<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let total = tasks.len();
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let (tx, mut rx) = mpsc::channel(total.max(1));

    for task in tasks {
        let sem = semaphore.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let result = task.await;
            let _ = tx.send(result).await;
        });
    }
    // Once every worker clone is gone the channel closes and the loop ends
    drop(tx);

    let deadline = tokio::time::sleep(overall_timeout);
    tokio::pin!(deadline);

    let mut results = Vec::with_capacity(total);
    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(result) => results.push(result),
                None => break,
            },
            _ = &mut deadline => break,
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_collects_all_results() {
        let tasks: Vec<_> = (0..20).map(|i| async move { i * 2 }).collect();
        let mut results = run_all(tasks, 4, Duration::from_secs(5)).await;
        results.sort();
        assert_eq!(results, (0..20).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_empty_task_list() {
        let tasks: Vec<std::future::Ready<u8>> = Vec::new();
        let results = run_all(tasks, 4, Duration::from_secs(1)).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_worker_cap_is_respected() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let in_flight = in_flight.clone();
                let high_water = high_water.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    high_water.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .collect();

        run_all(tasks, 4, Duration::from_secs(10)).await;
        assert!(high_water.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn test_overall_deadline_returns_partial_results() {
        // Half the tasks finish instantly, half hang well past the deadline
        let tasks: Vec<_> = (0..10)
            .map(|i| async move {
                if i % 2 == 0 {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
                i
            })
            .collect();

        let results = run_all(tasks, 10, Duration::from_millis(300)).await;
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|i| i % 2 == 1));
    }

    #[tokio::test]
    async fn test_panicking_task_is_excluded() {
        let tasks: Vec<_> = (0..4)
            .map(|i| async move {
                if i == 2 {
                    panic!("boom");
                }
                i
            })
            .collect();

        let mut results = run_all(tasks, 4, Duration::from_secs(5)).await;
        results.sort();
        assert_eq!(results, vec![0, 1, 3]);
    }

    #[tokio::test]
    async fn test_same_task_set_is_idempotent() {
        // Fixed always-succeed/always-fail outcomes must repeat across runs
        let build = || {
            (0..8)
                .map(|i| async move { if i % 3 == 0 { Ok(i) } else { Err(i) } })
                .collect::<Vec<_>>()
        };

        let mut first: Vec<_> = run_all(build(), 3, Duration::from_secs(5)).await;
        let mut second: Vec<_> = run_all(build(), 3, Duration::from_secs(5)).await;
        first.sort();
        second.sort();
        assert_eq!(first, second);
    }
}
