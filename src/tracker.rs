use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::AbortHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::api::{AnalysisApi, AnalysisId, JobProgress, JobStatus, SiteId};
use crate::config::{NOT_FOUND_RETRY_BUDGET, POLL_INTERVAL_MS};
use crate::error::{ApiError, StartError};

/// Lifecycle phase of one tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerPhase {
    Tracking,
    Completed,
    Failed,
    Stopped,
}

/// Read-only view of the tracked job, published on the watch channel
/// after every applied status observation.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    pub phase: TrackerPhase,
    pub status: Option<JobStatus>,
    pub progress_percentage: u8,
    pub current_step: Option<String>,
    pub steps_completed: Option<Vec<String>>,
    pub total_steps: Option<u32>,
    /// Status observations applied so far in this session.
    pub polls: u32,
}

impl ProgressSnapshot {
    fn tracking_started() -> Self {
        Self {
            phase: TrackerPhase::Tracking,
            status: None,
            progress_percentage: 0,
            current_step: None,
            steps_completed: None,
            total_steps: None,
            polls: 0,
        }
    }

    fn apply(&mut self, job: &JobProgress) {
        self.status = Some(job.status);
        self.progress_percentage = job.progress_percentage;
        self.current_step = job.current_step.clone();
        self.steps_completed = job.steps_completed.clone();
        self.total_steps = job.total_steps;
        self.polls += 1;
    }
}

/// Terminal result of one tracking session, delivered at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingOutcome {
    Completed { analysis_id: Option<AnalysisId> },
    Failed { message: String },
    Stopped,
}

/// Handle for one tracking session, returned by [`JobTracker::start`].
/// Cancellation goes through this handle (or through the tracker):
/// dropping it also stops the session, mirroring the owning view going
/// away.
pub struct TrackingHandle {
    site_id: SiteId,
    progress_rx: watch::Receiver<ProgressSnapshot>,
    outcome_rx: Option<oneshot::Receiver<TrackingOutcome>>,
    stop_tx: Arc<watch::Sender<bool>>,
    abort: AbortHandle,
}

impl TrackingHandle {
    pub fn site_id(&self) -> SiteId {
        self.site_id
    }

    /// Subscribe to progress snapshots.
    pub fn progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress_rx.clone()
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> ProgressSnapshot {
        self.progress_rx.borrow().clone()
    }

    /// Wait for the session's terminal outcome. Resolves to `Stopped` if
    /// the session was cancelled before a terminal status was observed,
    /// and on every call after the first.
    pub async fn wait(&mut self) -> TrackingOutcome {
        match self.outcome_rx.take() {
            Some(rx) => rx.await.unwrap_or(TrackingOutcome::Stopped),
            None => TrackingOutcome::Stopped,
        }
    }

    /// Cancel the session. No further polls are issued and no terminal
    /// outcome is observable once this returns: an in-flight fetch is
    /// discarded at its await point, and the outcome channel is severed.
    /// Idempotent.
    pub fn stop(&mut self) {
        let _ = self.stop_tx.send(true);
        self.abort.abort();
        self.outcome_rx = None;
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
        self.abort.abort();
    }
}

struct ActiveSession {
    stop_tx: Arc<watch::Sender<bool>>,
    abort: AbortHandle,
}

/// Tracks one analysis run at a time: triggers it, polls the producer's
/// progress record at a fixed cadence, and reports the terminal outcome
/// exactly once. The producer client is injected at construction.
pub struct JobTracker {
    api: Arc<AnalysisApi>,
    poll_interval: Duration,
    not_found_budget: u32,
    active: Option<ActiveSession>,
}

impl JobTracker {
    pub fn new(api: Arc<AnalysisApi>) -> Self {
        Self::with_cadence(
            api,
            Duration::from_millis(POLL_INTERVAL_MS),
            NOT_FOUND_RETRY_BUDGET,
        )
    }

    /// Custom poll cadence and not-found budget. Tests poll fast.
    pub fn with_cadence(api: Arc<AnalysisApi>, poll_interval: Duration, not_found_budget: u32) -> Self {
        Self {
            api,
            poll_interval,
            not_found_budget,
            active: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.active
            .as_ref()
            .map(|a| !a.abort.is_finished())
            .unwrap_or(false)
    }

    /// Trigger a run for `site_id` and begin polling immediately. Any
    /// previous session on this tracker is stopped first, so at most one
    /// poll loop is ever active per tracker.
    pub async fn start(&mut self, site_id: SiteId) -> Result<TrackingHandle, StartError> {
        self.stop();

        let receipt = self.api.trigger_run(site_id).await.map_err(|e| match e {
            ApiError::Server { message, .. } => StartError::Rejected { reason: message },
            other => StartError::Api(other),
        })?;
        info!("Analysis run accepted for site {}", site_id);

        let (progress_tx, progress_rx) = watch::channel(ProgressSnapshot::tracking_started());
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let stop_tx = Arc::new(stop_tx);

        let task = tokio::spawn(poll_loop(
            self.api.clone(),
            site_id,
            receipt.analysis_id,
            self.poll_interval,
            self.not_found_budget,
            progress_tx,
            outcome_tx,
            stop_rx,
        ));
        let abort = task.abort_handle();

        self.active = Some(ActiveSession {
            stop_tx: stop_tx.clone(),
            abort: abort.clone(),
        });

        Ok(TrackingHandle {
            site_id,
            progress_rx,
            outcome_rx: Some(outcome_rx),
            stop_tx,
            abort,
        })
    }

    /// Stop the active session, if any. Idempotent.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            let _ = active.stop_tx.send(true);
            active.abort.abort();
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn poll_loop(
    api: Arc<AnalysisApi>,
    site_id: SiteId,
    trigger_analysis_id: Option<AnalysisId>,
    interval: Duration,
    not_found_budget: u32,
    progress_tx: watch::Sender<ProgressSnapshot>,
    outcome_tx: oneshot::Sender<TrackingOutcome>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut snapshot = ProgressSnapshot::tracking_started();
    let mut consecutive_not_found: u32 = 0;

    // First fetch happens immediately; every subsequent tick is scheduled
    // only after the previous fetch has settled, so observations apply in
    // receipt order.
    loop {
        let result = api.fetch_progress(site_id).await;

        // A stop that landed while the fetch was in flight makes its
        // result a no-op.
        if *stop_rx.borrow() {
            return;
        }

        match result {
            Ok(job) => {
                consecutive_not_found = 0;
                snapshot.apply(&job);
                match job.status {
                    JobStatus::Completed => {
                        snapshot.phase = TrackerPhase::Completed;
                        let _ = progress_tx.send(snapshot.clone());
                        let analysis_id = job.analysis_id.or(trigger_analysis_id);
                        match analysis_id {
                            Some(id) => info!("Analysis {} completed for site {}", id, site_id),
                            None => info!("Analysis completed for site {}", site_id),
                        }
                        let _ = outcome_tx.send(TrackingOutcome::Completed { analysis_id });
                        return;
                    }
                    JobStatus::Failed => {
                        snapshot.phase = TrackerPhase::Failed;
                        let _ = progress_tx.send(snapshot.clone());
                        let message = job
                            .error_message
                            .clone()
                            .unwrap_or_else(|| "analysis failed without an error message".to_string());
                        warn!("Analysis failed for site {}: {}", site_id, message);
                        let _ = outcome_tx.send(TrackingOutcome::Failed { message });
                        return;
                    }
                    JobStatus::Pending | JobStatus::Running => {
                        let _ = progress_tx.send(snapshot.clone());
                    }
                }
            }
            Err(ApiError::NotFound) => {
                consecutive_not_found += 1;
                if consecutive_not_found >= not_found_budget {
                    snapshot.phase = TrackerPhase::Failed;
                    let _ = progress_tx.send(snapshot.clone());
                    let message = format!(
                        "no progress record appeared after {} polls; the job looks stuck",
                        consecutive_not_found
                    );
                    warn!("Site {}: {}", site_id, message);
                    let _ = outcome_tx.send(TrackingOutcome::Failed { message });
                    return;
                }
                debug!(
                    "No progress record for site {} yet ({}/{}), still polling",
                    site_id, consecutive_not_found, not_found_budget
                );
            }
            Err(ApiError::Malformed(e)) => {
                warn!("Ambiguous progress response for site {}: {}", site_id, e);
            }
            Err(e) => {
                warn!("Error polling progress for site {}: {}", site_id, e);
            }
        }

        tokio::select! {
            _ = sleep(interval) => {}
            _ = stop_rx.changed() => {
                if *stop_rx.borrow() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tracker_phase_serialization() {
        assert_eq!(
            serde_json::to_string(&TrackerPhase::Tracking).unwrap(),
            "\"tracking\""
        );
        assert_eq!(
            serde_json::to_string(&TrackerPhase::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn test_snapshot_initial_state() {
        let snap = ProgressSnapshot::tracking_started();
        assert_eq!(snap.phase, TrackerPhase::Tracking);
        assert!(snap.status.is_none());
        assert_eq!(snap.progress_percentage, 0);
        assert_eq!(snap.polls, 0);
    }

    #[test]
    fn test_snapshot_apply_counts_observations() {
        let mut snap = ProgressSnapshot::tracking_started();
        let job: JobProgress = serde_json::from_value(json!({
            "status": "running",
            "progress_percentage": 40,
            "current_step": "Fetching PageSpeed data"
        }))
        .unwrap();

        snap.apply(&job);
        assert_eq!(snap.status, Some(JobStatus::Running));
        assert_eq!(snap.progress_percentage, 40);
        assert_eq!(snap.current_step.as_deref(), Some("Fetching PageSpeed data"));
        assert_eq!(snap.polls, 1);

        snap.apply(&job);
        assert_eq!(snap.polls, 2);
    }
}
