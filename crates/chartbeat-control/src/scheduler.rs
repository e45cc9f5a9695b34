//! Real-time timeline replay
//!
//! Actions are dispatched one at a time, in timeline order, each after
//! sleeping until its offset from the performance start. A slow dispatch
//! delays everything behind it; late actions fire immediately and the
//! schedule never tries to catch up. Failed dispatches are logged and
//! counted, never fatal.

use crate::error::Result;
use async_trait::async_trait;
use chartbeat_core::Action;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Something that can execute a timed action
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, action: &Action) -> Result<()>;
}

/// Outcome of one timeline replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionReport {
    /// Actions the controller accepted
    pub dispatched: usize,
    /// Actions whose dispatch failed
    pub failed: usize,
    /// Replay was stopped before the end of the timeline
    pub cancelled: bool,
}

impl ExecutionReport {
    pub fn attempted(&self) -> usize {
        self.dispatched + self.failed
    }
}

/// Replays a sorted timeline against a dispatcher
#[derive(Debug, Clone)]
pub struct Scheduler {
    progress_every: usize,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Scheduler {
    pub fn new(progress_every: usize) -> Self {
        Self {
            progress_every: progress_every.max(1),
        }
    }

    /// Replay `actions` relative to `start`.
    pub async fn run<D>(&self, dispatcher: &D, actions: &[Action], start: Instant) -> ExecutionReport
    where
        D: Dispatch + ?Sized,
    {
        self.run_until(dispatcher, actions, start, std::future::pending::<()>())
            .await
    }

    /// Replay `actions`, stopping at the next wait once `shutdown` resolves.
    pub async fn run_until<D, F>(
        &self,
        dispatcher: &D,
        actions: &[Action],
        start: Instant,
        shutdown: F,
    ) -> ExecutionReport
    where
        D: Dispatch + ?Sized,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut report = ExecutionReport::default();

        for (i, action) in actions.iter().enumerate() {
            if let Some(delay) = delay_until(action.time, start) {
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = &mut shutdown => {
                        info!("Timeline stopped after {} of {} actions", i, actions.len());
                        report.cancelled = true;
                        return report;
                    }
                }
            }

            match dispatcher.dispatch(action).await {
                Ok(()) => {
                    report.dispatched += 1;
                    debug!("{:.3}s {} {}", action.time, action.method, action.path);
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        "Action at {:.3}s ({} {}) failed: {}",
                        action.time, action.method, action.path, e
                    );
                }
            }

            if (i + 1) % self.progress_every == 0 {
                info!(
                    "[{:.1}s] {}/{} actions fired",
                    start.elapsed().as_secs_f64(),
                    i + 1,
                    actions.len()
                );
            }
        }
        report
    }
}

/// Time left before `offset_secs` after `start`, or `None` if already due
fn delay_until(offset_secs: f64, start: Instant) -> Option<Duration> {
    let remaining = offset_secs - start.elapsed().as_secs_f64();
    (remaining > 0.0).then(|| wait_for(remaining))
}

/// Positive seconds as a sleep; too large to represent waits indefinitely
fn wait_for(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Wait until `duration_secs + buffer` after `start`.
pub async fn wait_out(start: Instant, duration_secs: f64, buffer: Duration) {
    let remaining = duration_secs + buffer.as_secs_f64() - start.elapsed().as_secs_f64();
    if remaining > 0.0 {
        info!("Waiting {:.1}s for the clip to finish", remaining);
        sleep(wait_for(remaining)).await;
    }
}
