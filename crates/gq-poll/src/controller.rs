//! Poll controller
//!
//! State machine for one mounted panel:
//!
//! ```text
//! Idle ──start──▶ Loading ──accepted──▶ Populated ─┐
//!                    │                              │ every interval
//!                    └──failed/rejected──▶ Synthetic ┘──▶ Loading
//!
//! Any ──stop──▶ Terminal
//! ```
//!
//! Every request gets a sequence number. A result commits only if no newer
//! request has committed, so a slow response from an earlier tick cannot
//! overwrite a faster one from a later tick. Stopping the session aborts
//! in-flight requests and rejects any commit that races with the stop.

use crate::error::PollFailure;
use crate::state::{DataStatus, PollPhase, ViewState};
use crate::transport::Fetcher;
use chrono::Utc;
use gq_core::{ClientConfig, Dataset, DatasetKind, Query, SnapshotSource};
use gq_synth::{FixtureGenerator, Synthesize};
use gq_validate::Validate;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// View state for dataset `D`
pub type DatasetViewState<D> = ViewState<<D as Dataset>::Record, <D as Dataset>::Metrics>;

/// Shortest interval a session will poll at
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Generator shared between sessions
pub type SharedGenerator = Arc<Mutex<FixtureGenerator>>;

/// What one poll cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Live snapshot committed
    Live,
    /// Synthetic snapshot committed
    Synthetic,
    /// Failure recorded, previous snapshot kept
    Error,
    /// Result discarded because a newer request already committed
    Stale,
    /// Session stopped; nothing fetched or committed
    Stopped,
}

/// Polling controller for one dataset
pub struct PollController<D: Validate + Synthesize> {
    name: String,
    query: Query,
    interval: Duration,
    synthetic_fallback: bool,
    fetcher: Arc<dyn Fetcher>,
    generator: SharedGenerator,
    state: watch::Sender<DatasetViewState<D>>,
    issued: AtomicU64,
    terminated: AtomicBool,
}

impl<D: Validate + Synthesize> std::fmt::Debug for PollController<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollController")
            .field("name", &self.name)
            .field("dataset", &D::KIND)
            .field("interval", &self.interval)
            .field("issued", &self.issued.load(Ordering::Relaxed))
            .field("terminated", &self.terminated.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<D: Validate + Synthesize> PollController<D> {
    /// Create a controller using the dataset's configured interval
    #[must_use]
    pub fn new(config: &ClientConfig, fetcher: Arc<dyn Fetcher>, generator: SharedGenerator) -> Self {
        let (state, _) = watch::channel(ViewState::idle());
        Self {
            name: D::KIND.as_str().to_string(),
            query: Query::new(),
            interval: config.poll_interval_for(D::KIND),
            synthetic_fallback: config.synthetic_fallback,
            fetcher,
            generator,
            state,
            issued: AtomicU64::new(0),
            terminated: AtomicBool::new(false),
        }
    }

    /// With session name (defaults to the dataset name)
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// With query filters
    #[inline]
    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// With explicit poll interval, raised to at least one millisecond
    #[inline]
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    /// Session name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dataset kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DatasetKind {
        D::KIND
    }

    /// Poll interval
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Requests issued so far
    #[inline]
    #[must_use]
    pub fn requests_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Subscribe to committed state
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DatasetViewState<D>> {
        self.state.subscribe()
    }

    /// Clone of the current state
    #[must_use]
    pub fn current(&self) -> DatasetViewState<D> {
        self.state.borrow().clone()
    }

    /// Whether the session has been stopped
    #[inline]
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Run one fetch → validate → commit cycle
    pub async fn tick(&self) -> TickOutcome {
        if self.is_terminated() {
            return TickOutcome::Stopped;
        }

        // Sequence allocation and the Loading mark happen under the state lock,
        // so a newer commit can never be followed by an older Loading mark
        let mut seq = 0;
        self.state.send_if_modified(|state| {
            seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            if state.phase.is_terminal() || state.phase == PollPhase::Loading {
                return false;
            }
            state.phase = PollPhase::Loading;
            true
        });
        debug!(session = %self.name, dataset = %D::KIND, seq, "poll tick");

        match self.fetch_records().await {
            Ok(records) => {
                let snapshot = D::snapshot(records, SnapshotSource::Live);
                self.commit(seq, TickOutcome::Live, |state| {
                    state.phase = PollPhase::Populated;
                    state.status = Some(DataStatus::Live);
                    state.snapshot = Some(Arc::new(snapshot));
                    state.last_error = None;
                })
            }
            Err(failure) if self.synthetic_fallback => {
                warn!(session = %self.name, dataset = %D::KIND, seq, error = %failure, "falling back to synthetic data");
                let snapshot = self.generator.lock().snapshot::<D>();
                let message = failure.to_string();
                self.commit(seq, TickOutcome::Synthetic, |state| {
                    state.phase = PollPhase::Synthetic;
                    state.status = Some(DataStatus::Synthetic);
                    state.snapshot = Some(Arc::new(snapshot));
                    state.last_error = Some(message);
                })
            }
            Err(failure) => {
                warn!(session = %self.name, dataset = %D::KIND, seq, error = %failure, "poll failed, keeping previous snapshot");
                let message = failure.to_string();
                self.commit(seq, TickOutcome::Error, |state| {
                    state.phase = match state.snapshot.as_ref().map(|s| s.is_synthetic()) {
                        Some(true) => PollPhase::Synthetic,
                        Some(false) => PollPhase::Populated,
                        None => PollPhase::Idle,
                    };
                    state.status = Some(DataStatus::Error);
                    state.last_error = Some(message);
                })
            }
        }
    }

    /// Fetch and validate one payload
    async fn fetch_records(&self) -> Result<Vec<D::Record>, PollFailure> {
        let value = self.fetcher.fetch(D::KIND.endpoint(), &self.query).await?;
        Ok(D::validate(&value)?)
    }

    /// Publish `apply`'s changes if `seq` is still the newest result
    fn commit<F>(&self, seq: u64, outcome: TickOutcome, apply: F) -> TickOutcome
    where
        F: FnOnce(&mut DatasetViewState<D>),
    {
        let mut result = TickOutcome::Stale;
        self.state.send_if_modified(|state| {
            if self.terminated.load(Ordering::SeqCst) || state.phase.is_terminal() {
                result = TickOutcome::Stopped;
                return false;
            }
            if state.generation >= seq {
                return false;
            }
            apply(state);
            state.generation = seq;
            state.updated_at = Some(Utc::now());
            result = outcome;
            true
        });

        if result == TickOutcome::Stale {
            debug!(session = %self.name, seq, "discarding stale response");
        }
        result
    }

    /// Mark the session terminal; later commits are rejected
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
        self.state.send_modify(|state| state.phase = PollPhase::Terminal);
    }

    /// Start polling: first request immediately, then every interval
    #[must_use]
    pub fn spawn(self: Arc<Self>) -> PollHandle<D> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let controller = Arc::clone(&self);
        info!(session = %self.name, dataset = %D::KIND, interval_secs = self.interval.as_secs(), "poll session started");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(controller.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut inflight = JoinSet::new();

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        let c = Arc::clone(&controller);
                        inflight.spawn(async move { c.tick().await });
                    }
                    Some(joined) = inflight.join_next(), if !inflight.is_empty() => {
                        if let Err(e) = joined {
                            if e.is_panic() {
                                warn!(session = %controller.name, "poll request panicked");
                            }
                        }
                    }
                }
            }

            inflight.abort_all();
        });

        PollHandle {
            controller: self,
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }
}

/// Owner of a running poll session
///
/// Dropping the handle stops the session.
pub struct PollHandle<D: Validate + Synthesize> {
    controller: Arc<PollController<D>>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl<D: Validate + Synthesize> std::fmt::Debug for PollHandle<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("controller", &self.controller)
            .field("running", &self.task.is_some())
            .finish()
    }
}

impl<D: Validate + Synthesize> PollHandle<D> {
    /// Controller driving this session
    #[inline]
    #[must_use]
    pub fn controller(&self) -> &Arc<PollController<D>> {
        &self.controller
    }

    /// Subscribe to committed state
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DatasetViewState<D>> {
        self.controller.subscribe()
    }

    /// Clone of the current state
    #[must_use]
    pub fn current(&self) -> DatasetViewState<D> {
        self.controller.current()
    }

    /// Manual refresh outside the timer
    pub async fn refresh(&self) -> TickOutcome {
        self.controller.tick().await
    }

    /// Stop without waiting for the task to unwind
    pub fn shutdown(&mut self) {
        if self.task.is_none() {
            return;
        }
        self.controller.terminate();
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        info!(session = %self.controller.name, "poll session stopped");
    }

    /// Stop and wait until the polling task has exited
    pub async fn stop(mut self) {
        self.controller.terminate();
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        info!(session = %self.controller.name, "poll session stopped");
    }
}

impl<D: Validate + Synthesize> Drop for PollHandle<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Type-erased session for registries
pub trait MountedSession: Send + Sync + std::fmt::Debug {
    /// Session name
    fn name(&self) -> &str;
    /// Dataset kind
    fn kind(&self) -> DatasetKind;
    /// Requests issued so far
    fn requests_issued(&self) -> u64;
    /// Stop polling
    fn shutdown(&mut self);
}

impl<D: Validate + Synthesize> MountedSession for PollHandle<D> {
    fn name(&self) -> &str {
        self.controller.name()
    }

    fn kind(&self) -> DatasetKind {
        D::KIND
    }

    fn requests_issued(&self) -> u64 {
        self.controller.requests_issued()
    }

    fn shutdown(&mut self) {
        PollHandle::shutdown(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use gq_core::{Correlations, Entities};
    use serde_json::{json, Value};

    #[derive(Debug)]
    struct FixedFetcher(Result<Value, FetchError>);

    #[async_trait]
    impl Fetcher for FixedFetcher {
        async fn fetch(&self, _path: &str, _query: &Query) -> Result<Value, FetchError> {
            self.0.clone()
        }
    }

    fn controller<D: Validate + Synthesize>(
        response: Result<Value, FetchError>,
        config: &ClientConfig,
    ) -> PollController<D> {
        PollController::new(
            config,
            Arc::new(FixedFetcher(response)),
            Arc::new(Mutex::new(FixtureGenerator::seeded(1))),
        )
    }

    #[tokio::test]
    async fn starts_idle() {
        let c = controller::<Correlations>(Ok(json!({"pairs": []})), &ClientConfig::new());
        let state = c.current();
        assert_eq!(state.phase, PollPhase::Idle);
        assert!(state.snapshot.is_none());
        assert_eq!(state.status, None);
    }

    #[tokio::test]
    async fn live_commit() {
        let payload = json!({"pairs": [
            {"asset_a": "BTC", "asset_b": "ETH", "coefficient": 0.82, "strength": "strong"}
        ]});
        let c = controller::<Correlations>(Ok(payload), &ClientConfig::new());

        assert_eq!(c.tick().await, TickOutcome::Live);
        let state = c.current();
        assert_eq!(state.phase, PollPhase::Populated);
        assert_eq!(state.status, Some(DataStatus::Live));
        assert_eq!(state.record_count(), 1);
        assert_eq!(state.generation, 1);
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn failure_commits_synthetic() {
        let c = controller::<Entities>(Err(FetchError::Timeout), &ClientConfig::new());

        assert_eq!(c.tick().await, TickOutcome::Synthetic);
        let state = c.current();
        assert_eq!(state.phase, PollPhase::Synthetic);
        assert_eq!(state.status, Some(DataStatus::Synthetic));
        assert!(state.record_count() > 0);
        assert_eq!(state.last_error.as_deref(), Some("request timed out"));
    }

    #[tokio::test]
    async fn failure_without_fallback_keeps_previous() {
        let config = ClientConfig::new().with_synthetic_fallback(false);
        let c = controller::<Entities>(Err(FetchError::EmptyBody), &config);

        assert_eq!(c.tick().await, TickOutcome::Error);
        let state = c.current();
        assert_eq!(state.status, Some(DataStatus::Error));
        assert!(state.snapshot.is_none());
        assert_eq!(state.last_error.as_deref(), Some("empty response body"));
    }

    #[tokio::test]
    async fn terminated_controller_does_not_fetch() {
        let c = controller::<Entities>(Err(FetchError::Timeout), &ClientConfig::new());
        c.terminate();

        assert_eq!(c.tick().await, TickOutcome::Stopped);
        assert_eq!(c.requests_issued(), 0);
        assert_eq!(c.current().phase, PollPhase::Terminal);
    }

    #[tokio::test]
    async fn older_sequence_is_stale() {
        let c = controller::<Correlations>(Ok(json!({"pairs": []})), &ClientConfig::new());
        assert_eq!(c.tick().await, TickOutcome::Live);
        assert_eq!(c.tick().await, TickOutcome::Live);

        let outcome = c.commit(1, TickOutcome::Live, |state| state.last_error = Some("old".into()));
        assert_eq!(outcome, TickOutcome::Stale);
        assert_eq!(c.current().generation, 2);
        assert!(c.current().last_error.is_none());
    }

    #[test]
    fn interval_from_config() {
        let c = controller::<Entities>(Ok(json!([])), &ClientConfig::new().with_poll_interval_secs(15));
        assert_eq!(c.interval(), Duration::from_secs(15));
        assert_eq!(c.name(), "entities");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_raised_to_minimum() {
        let c = controller::<Entities>(Ok(json!({"entities": []})), &ClientConfig::new())
            .with_interval(Duration::ZERO);
        assert_eq!(c.interval(), MIN_INTERVAL);

        let handle = Arc::new(c).spawn();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(handle.controller().requests_issued() >= 2);
        handle.stop().await;
    }
}
