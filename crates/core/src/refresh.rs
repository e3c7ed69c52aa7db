//! Periodic refresh.
//!
//! [`ScheduledTask`] runs an async job on a fixed period until it is
//! cancelled or dropped. The first run happens immediately, which doubles as
//! the dashboard's initial load. The period is injected so tests can drive
//! it with paused `tokio` time.

use crate::dashboard::TriageDashboard;
use crate::{TriageError, TriageResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running periodic job.
///
/// Dropping the handle aborts the job; [`ScheduledTask::cancel`] stops it
/// after any in-flight run completes.
#[derive(Debug)]
pub struct ScheduledTask {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Spawn `job` onto the current runtime, running it every `period`.
    ///
    /// Runs never overlap: a run that outlasts the period delays the next one.
    ///
    /// # Errors
    ///
    /// Returns `TriageError::InvalidInput` if `period` is zero.
    pub fn spawn<F, Fut>(period: Duration, mut job: F) -> TriageResult<Self>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period.is_zero() {
            return Err(TriageError::InvalidInput(
                "refresh period must be greater than zero".into(),
            ));
        }

        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => job().await,
                }
            }
        });

        Ok(Self {
            shutdown: Some(shutdown),
            handle: Some(handle),
        })
    }

    /// Stop the job and wait for it to finish.
    pub async fn cancel(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // The task may already be gone; nothing to signal then.
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    tracing::warn!(error = %err, "scheduled task ended abnormally");
                }
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Reload `dashboard` now and then every `period`.
///
/// Load failures are already recorded on the dashboard, so the job only logs them.
pub fn spawn_refresh(
    dashboard: Arc<TriageDashboard>,
    period: Duration,
) -> TriageResult<ScheduledTask> {
    tracing::info!(period_secs = period.as_secs(), "starting periodic refresh");

    ScheduledTask::spawn(period, move || {
        let dashboard = dashboard.clone();
        async move {
            if let Err(err) = dashboard.load_patients().await {
                tracing::debug!(error = %err, "scheduled refresh failed");
            }
        }
    })
}
