use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::feed::StatusFeed;
use crate::backend::BackendError;
use crate::readiness::{HistoryPage, Job};

const EVENT_BUFFER: usize = 16;

#[derive(Debug)]
pub enum PollEvent<T> {
    Update(T),
    /// A fetch failed. Status watches retry on the next tick; history
    /// watches end here.
    Error(BackendError),
}

/// What a poller does after a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnError {
    Retry,
    Stop,
}

/// Handle to a running poller.
#[derive(Debug)]
pub struct PollSubscription<T> {
    events: mpsc::Receiver<PollEvent<T>>,
    cancel: CancellationToken,
    stopped: bool,
}

impl<T> PollSubscription<T> {
    /// Next event, or `None` once the poller has finished or was stopped.
    pub async fn next(&mut self) -> Option<PollEvent<T>> {
        if self.stopped {
            return None;
        }
        self.events.recv().await
    }

    /// Cancel the timer. No further events are delivered.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.cancel.cancel();
        self.events.close();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl<T> Drop for PollSubscription<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn spawn_poller<T, F, Fut, D>(
    period: Duration,
    on_error: OnError,
    mut fetch: F,
    settled: D,
) -> PollSubscription<T>
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, BackendError>> + Send + 'static,
    D: Fn(&T) -> bool + Send + 'static,
{
    let (tx, events) = mpsc::channel(EVENT_BUFFER);
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                result = fetch() => result,
            };

            let (event, done) = match result {
                Ok(value) => {
                    let done = settled(&value);
                    (PollEvent::Update(value), done)
                }
                Err(err) => {
                    warn!(error = %err, ?on_error, "poll fetch failed");
                    (PollEvent::Error(err), on_error == OnError::Stop)
                }
            };

            if token.is_cancelled() || tx.send(event).await.is_err() {
                break;
            }
            if done {
                debug!("poller reached a settled state");
                break;
            }
        }
    });

    PollSubscription {
        events,
        cancel,
        stopped: false,
    }
}

/// Follow one job until it completes or fails.
pub fn watch_job<F: StatusFeed>(
    feed: Arc<F>,
    job_id: impl Into<String>,
    period: Duration,
) -> PollSubscription<Job> {
    let job_id = job_id.into();
    debug!(job_id = %job_id, ?period, "watching job status");
    spawn_poller(
        period,
        OnError::Retry,
        move || {
            let feed = Arc::clone(&feed);
            let job_id = job_id.clone();
            async move { feed.job_status(&job_id).await }
        },
        |job: &Job| job.status.is_terminal(),
    )
}

/// Refresh the merged history while the row for `job_id` is still running.
/// The first failed refresh ends the watch.
pub fn watch_history<F: StatusFeed>(
    feed: Arc<F>,
    job_id: impl Into<String>,
    limit: u32,
    period: Duration,
) -> PollSubscription<HistoryPage> {
    let job_id = job_id.into();
    let watched = job_id.clone();
    debug!(job_id = %job_id, ?period, "watching history");
    spawn_poller(
        period,
        OnError::Stop,
        move || {
            let feed = Arc::clone(&feed);
            async move { feed.history(limit).await }
        },
        move |page: &HistoryPage| !page.job_running(&watched),
    )
}
