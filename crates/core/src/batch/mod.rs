//! Throttled batch detail fetching
//!
//! The backend rate-limits aggressively without documenting the limit, so
//! detail lookups for a listing run sequentially in fixed-size batches with
//! a pause after every call and a longer pause between batches. One item's
//! failure is recorded and skipped; it never aborts the batch.

use std::future::Future;
use std::time::Duration;

use practicebridge_domain::constants::{
    DEFAULT_BATCH_DELAY_MS, DEFAULT_BATCH_SIZE, DEFAULT_CALL_DELAY_MS,
};
use practicebridge_domain::BridgeError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Self-throttling settings for batch lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPolicy {
    pub batch_size: usize,
    pub call_delay: Duration,
    pub batch_delay: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            call_delay: Duration::from_millis(DEFAULT_CALL_DELAY_MS),
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
        }
    }
}

/// Result of a batch run: successful items in input order plus the ids
/// that failed.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub items: Vec<T>,
    pub failures: Vec<(String, BridgeError)>,
}

impl<T> BatchReport<T> {
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Fetch every id with `fetch`, sequentially, honouring `policy`.
///
/// The call delay is slept after each call except the last of a batch; the
/// batch delay is slept between batches.
pub async fn fetch_in_batches<T, F, Fut>(
    ids: &[String],
    policy: &BatchPolicy,
    mut fetch: F,
) -> BatchReport<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, BridgeError>>,
{
    let batch_size = policy.batch_size.max(1);
    let batch_count = ids.len().div_ceil(batch_size);
    let mut report = BatchReport { items: Vec::with_capacity(ids.len()), failures: Vec::new() };

    for (batch_index, batch) in ids.chunks(batch_size).enumerate() {
        debug!(batch = batch_index + 1, batch_count, size = batch.len(), "fetching batch");

        for (position, id) in batch.iter().enumerate() {
            match fetch(id.clone()).await {
                Ok(item) => report.items.push(item),
                Err(err) => {
                    warn!(id = %id, error = %err, "batch item failed, skipping");
                    report.failures.push((id.clone(), err));
                }
            }

            if position + 1 < batch.len() && !policy.call_delay.is_zero() {
                tokio::time::sleep(policy.call_delay).await;
            }
        }

        if batch_index + 1 < batch_count && !policy.batch_delay.is_zero() {
            tokio::time::sleep(policy.batch_delay).await;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::time::Instant;

    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| i.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn failed_item_is_dropped_and_delays_are_kept() {
        let policy = BatchPolicy {
            batch_size: 5,
            call_delay: Duration::from_millis(100),
            batch_delay: Duration::from_secs(1),
        };
        let calls: Arc<Mutex<Vec<(String, Instant)>>> = Arc::default();
        let recorder = calls.clone();

        let report = fetch_in_batches(&ids(5), &policy, move |id| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push((id.clone(), Instant::now()));
                if id == "3" {
                    Err(BridgeError::Network("HTTP request timed out".into()))
                } else {
                    Ok(format!("appt-{id}"))
                }
            }
        })
        .await;

        assert_eq!(report.items, vec!["appt-1", "appt-2", "appt-4", "appt-5"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "3");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 5);
        for pair in calls.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= Duration::from_millis(100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn batch_delay_separates_batches() {
        let policy = BatchPolicy {
            batch_size: 2,
            call_delay: Duration::from_millis(10),
            batch_delay: Duration::from_millis(500),
        };
        let started = Instant::now();

        let report =
            fetch_in_batches(&ids(3), &policy, |id| async move { Ok::<_, BridgeError>(id) }).await;

        assert_eq!(report.items.len(), 3);
        // one call delay inside the first batch, one batch delay
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(510) && elapsed < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn empty_input_makes_no_calls() {
        let report = fetch_in_batches(&[], &BatchPolicy::default(), |_id| async {
            Err::<(), _>(BridgeError::Internal("should not be called".into()))
        })
        .await;

        assert!(report.items.is_empty());
        assert!(report.failures.is_empty());
    }
}
