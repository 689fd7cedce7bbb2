use crate::utils::error::{Result, VenueError};
use futures::future::join_all;
use std::future::Future;
use tokio::sync::Semaphore;

/// Runs `task` for every item with at most `limit` in flight, waits for all
/// of them, and returns the results in input order.
pub async fn bounded_join_all<'a, T, R, F, Fut>(items: &'a [T], limit: usize, task: F) -> Vec<Result<R>>
where
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let semaphore = Semaphore::new(limit.max(1));
    let semaphore = &semaphore;
    let task = &task;

    let futures = items.iter().map(move |item| async move {
        let _permit = semaphore
            .acquire()
            .await
            .map_err(|e| VenueError::ProcessingError {
                message: format!("concurrency limiter closed: {}", e),
            })?;
        task(item).await
    });

    join_all(futures).await
}

/// Keeps the successes of a fan-out. Failures are logged; the batch only
/// fails when it was non-empty and nothing succeeded.
pub fn collect_successes<R>(what: &str, results: Vec<Result<R>>) -> Result<Vec<R>> {
    let total = results.len();
    let mut successes = Vec::with_capacity(total);
    let mut last_error = None;

    for result in results {
        match result {
            Ok(value) => successes.push(value),
            Err(e) => {
                tracing::warn!("⚠️ {} failed: {}", what, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if successes.is_empty() => Err(e),
        _ => {
            if successes.len() < total {
                tracing::warn!("{}: {} of {} succeeded", what, successes.len(), total);
            }
            Ok(successes)
        }
    }
}
