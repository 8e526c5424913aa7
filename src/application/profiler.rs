//! Debounced scheduling for reactive profiling.
//!
//! Each call to [`ProfileScheduler::schedule`] cancels the pending job (if
//! its debounce window has not yet elapsed) and starts a new window. Once a
//! job has started it runs to completion; callers tag its results with the
//! segment they were computed for and drop them if the selection moved on.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

pub struct ProfileScheduler {
    debounce: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl ProfileScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: Mutex::new(None),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Runs `job` after the debounce window unless superseded first.
    pub fn schedule<F, Fut>(&self, job: F) -> JoinHandle<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.swap_pending(Some(token.clone())) {
            previous.cancel();
        }

        let debounce = self.debounce;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("Profile request superseded before debounce elapsed");
                }
                _ = sleep(debounce) => job().await,
            }
        })
    }

    /// Cancels the pending job, if any.
    pub fn cancel(&self) {
        if let Some(previous) = self.swap_pending(None) {
            previous.cancel();
        }
    }

    fn swap_pending(&self, next: Option<CancellationToken>) -> Option<CancellationToken> {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *pending, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn recorder() -> (Arc<AtomicU32>, Arc<Mutex<Vec<u32>>>) {
        (Arc::new(AtomicU32::new(0)), Arc::new(Mutex::new(Vec::new())))
    }

    #[tokio::test(start_paused = true)]
    async fn job_runs_after_debounce() {
        let scheduler = ProfileScheduler::new(Duration::from_millis(500));
        let (count, _) = recorder();
        let c = count.clone();

        let handle = scheduler.schedule(move || async move {
            c.fetch_add(1, Ordering::SeqCst);
        });

        sleep(Duration::from_millis(499)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        handle.await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_reschedules_run_only_last_job() {
        let scheduler = ProfileScheduler::new(Duration::from_millis(500));
        let (_, seen) = recorder();
        let mut handles = Vec::new();

        for id in 1..=3u32 {
            let seen = seen.clone();
            handles.push(scheduler.schedule(move || async move {
                seen.lock().unwrap().push(id);
            }));
            sleep(Duration::from_millis(200)).await;
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_job() {
        let scheduler = ProfileScheduler::new(Duration::from_millis(500));
        let (count, _) = recorder();
        let c = count.clone();

        let handle = scheduler.schedule(move || async move {
            c.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.cancel();
        handle.await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn started_job_is_not_cancelled() {
        let scheduler = ProfileScheduler::new(Duration::from_millis(500));
        let (count, _) = recorder();
        let c = count.clone();

        let handle = scheduler.schedule(move || async move {
            sleep(Duration::from_secs(2)).await;
            c.fetch_add(1, Ordering::SeqCst);
        });
        sleep(Duration::from_millis(600)).await;
        scheduler.schedule(|| async {});
        handle.await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
