use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{LifecycleError, Result};
use crate::record::{LifecycleRecord, NewLifecycleRecord};
use crate::state::ProvisioningState;
use crate::store::LifecycleStore;

/// Sole reader and writer of the provisioning lifecycle.
///
/// Every operation persists a new record through the store. The tracker
/// does not validate transitions itself; callers gate on
/// [`current_provisioning_state`](Self::current_provisioning_state) (see
/// [`ensure_not_running`]) before starting or resetting.
///
/// Transitions are serialized: reading the previous record and saving the
/// next one happen under one lock, so a shutdown hook racing a normal stop
/// always sees the state the stop left behind.
pub struct ProvisioningTracker<S> {
    store: S,
    transition_lock: Mutex<()>,
}

impl<S: LifecycleStore> ProvisioningTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            transition_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    pub fn start_provisioning(&self) -> Result<LifecycleRecord> {
        self.persist(ProvisioningState::Started, None)
    }

    /// Mark the current run as successfully finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    pub fn stop_provisioning(&self) -> Result<LifecycleRecord> {
        self.persist(ProvisioningState::Completed, None)
    }

    /// Mark the current run as failed with `cause`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    pub fn stop_provisioning_with_error(
        &self,
        cause: &(dyn std::error::Error + 'static),
    ) -> Result<LifecycleRecord> {
        self.persist(ProvisioningState::Error, Some(render_cause(cause)))
    }

    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    pub fn interrupt_provisioning(&self) -> Result<LifecycleRecord> {
        self.persist(ProvisioningState::Interrupt, None)
    }

    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    pub fn reset_provisioning(&self) -> Result<LifecycleRecord> {
        self.persist(ProvisioningState::Reset, None)
    }

    /// The most recently persisted record, or the synthetic `INITIAL` record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn current_provisioning_state(&self) -> Result<LifecycleRecord> {
        Ok(self
            .store
            .find_latest()?
            .unwrap_or_else(LifecycleRecord::initial))
    }

    /// Shutdown hook: a run still marked `STARTED` becomes `INTERRUPT`.
    ///
    /// Returns the persisted record, or `None` when nothing was running.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn on_shutdown(&self) -> Result<Option<LifecycleRecord>> {
        let _transition = self.lock_transitions()?;
        let current = self.current_provisioning_state()?;
        if !current.is_running() {
            return Ok(None);
        }
        warn!(id = current.id, "shutting down with provisioning in progress");
        self.persist_locked(&current, ProvisioningState::Interrupt, None)
            .map(Some)
    }

    fn lock_transitions(&self) -> Result<MutexGuard<'_, ()>> {
        self.transition_lock
            .lock()
            .map_err(|_| LifecycleError::Poisoned)
    }

    fn persist(&self, state: ProvisioningState, cause: Option<String>) -> Result<LifecycleRecord> {
        let _transition = self.lock_transitions()?;
        let previous = self.current_provisioning_state()?;
        self.persist_locked(&previous, state, cause)
    }

    fn persist_locked(
        &self,
        previous: &LifecycleRecord,
        state: ProvisioningState,
        cause: Option<String>,
    ) -> Result<LifecycleRecord> {
        let mut draft = NewLifecycleRecord::following(previous, state, Utc::now());
        if let Some(cause) = cause {
            draft = draft.with_cause(cause);
        }
        let saved = self.store.save(draft)?;
        info!(
            id = saved.id,
            from = %previous.state,
            to = %saved.state,
            cause = saved.cause.as_deref(),
            "provisioning state changed"
        );
        Ok(saved)
    }
}

fn render_cause(cause: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = cause.to_string();
    let mut source = cause.source();
    while let Some(inner) = source {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        source = inner.source();
    }
    rendered
}

/// Reject with [`LifecycleError::Conflict`] while a run is in progress.
///
/// # Errors
///
/// Returns [`LifecycleError::Conflict`] if `current` is `STARTED`.
pub fn ensure_not_running(current: &LifecycleRecord) -> Result<()> {
    if current.is_running() {
        return Err(LifecycleError::Conflict {
            state: current.state,
        });
    }
    Ok(())
}

/// Runs the tracker's shutdown hook when dropped.
///
/// Hold one for the lifetime of the process so an in-flight run is never
/// left marked `STARTED` after an orderly exit.
pub struct ShutdownGuard<S: LifecycleStore> {
    tracker: Arc<ProvisioningTracker<S>>,
}

impl<S: LifecycleStore> ShutdownGuard<S> {
    #[must_use]
    pub fn new(tracker: Arc<ProvisioningTracker<S>>) -> Self {
        Self { tracker }
    }
}

impl<S: LifecycleStore> Drop for ShutdownGuard<S> {
    fn drop(&mut self) {
        if let Err(error) = self.tracker.on_shutdown() {
            warn!(%error, "failed to record interrupted provisioning on shutdown");
        }
    }
}

/// Wait for `signal` to resolve, then run the shutdown hook.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub async fn watch_shutdown<S, F>(
    tracker: Arc<ProvisioningTracker<S>>,
    signal: F,
) -> Result<Option<LifecycleRecord>>
where
    S: LifecycleStore,
    F: Future<Output = ()>,
{
    signal.await;
    info!("shutdown signal received");
    tracker.on_shutdown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryLifecycleStore;

    #[derive(Debug, thiserror::Error)]
    #[error("push rejected")]
    struct PushRejected(#[source] std::io::Error);

    fn tracker() -> ProvisioningTracker<InMemoryLifecycleStore> {
        ProvisioningTracker::new(InMemoryLifecycleStore::new())
    }

    #[test]
    fn current_state_defaults_to_initial() {
        let tracker = tracker();

        let current = tracker.current_provisioning_state().expect("read");

        assert_eq!(current.state, ProvisioningState::Initial);
        assert!(tracker.store().history().expect("read").is_empty());
    }

    #[test]
    fn each_operation_persists_its_state() {
        let tracker = tracker();

        assert_eq!(
            tracker.start_provisioning().expect("start").state,
            ProvisioningState::Started
        );
        assert_eq!(
            tracker.stop_provisioning().expect("stop").state,
            ProvisioningState::Completed
        );
        assert_eq!(
            tracker.reset_provisioning().expect("reset").state,
            ProvisioningState::Reset
        );
        assert_eq!(
            tracker.interrupt_provisioning().expect("interrupt").state,
            ProvisioningState::Interrupt
        );
        assert_eq!(tracker.store().history().expect("read").len(), 4);
    }

    #[test]
    fn error_stop_records_the_cause_chain() {
        let tracker = tracker();
        tracker.start_provisioning().expect("start");
        let cause = PushRejected(std::io::Error::other("connection reset"));

        let record = tracker.stop_provisioning_with_error(&cause).expect("stop");

        assert_eq!(record.state, ProvisioningState::Error);
        assert_eq!(
            record.cause.as_deref(),
            Some("push rejected: connection reset")
        );
        assert!(record.provisioning_start_time.is_some());
        assert!(record.provisioning_end_time.is_some());
    }

    #[test]
    fn tracker_does_not_gate_conflicting_starts() {
        let tracker = tracker();
        tracker.start_provisioning().expect("first start");

        let second = tracker.start_provisioning().expect("second start persists");

        assert_eq!(second.id, 2);
        assert!(ensure_not_running(&second).is_err());
    }

    #[test]
    fn shutdown_interrupts_a_running_provisioning() {
        let tracker = tracker();
        tracker.start_provisioning().expect("start");

        let record = tracker.on_shutdown().expect("hook").expect("interrupted");

        assert_eq!(record.state, ProvisioningState::Interrupt);
        assert_eq!(
            tracker.current_provisioning_state().expect("read").state,
            ProvisioningState::Interrupt
        );
    }

    #[test]
    fn shutdown_leaves_finished_runs_alone() {
        let tracker = tracker();
        tracker.start_provisioning().expect("start");
        tracker.stop_provisioning().expect("stop");

        assert!(tracker.on_shutdown().expect("hook").is_none());
        assert_eq!(tracker.store().history().expect("read").len(), 2);
    }

    /// Store whose reads are slow enough for two transitions to overlap.
    struct SlowReads(InMemoryLifecycleStore);

    impl LifecycleStore for SlowReads {
        fn save(&self, record: NewLifecycleRecord) -> Result<LifecycleRecord> {
            self.0.save(record)
        }

        fn find_latest(&self) -> Result<Option<LifecycleRecord>> {
            std::thread::sleep(std::time::Duration::from_millis(5));
            self.0.find_latest()
        }

        fn history(&self) -> Result<Vec<LifecycleRecord>> {
            self.0.history()
        }
    }

    #[test]
    fn shutdown_racing_a_stop_never_interrupts_a_finished_run() {
        for _ in 0..10 {
            let tracker = ProvisioningTracker::new(SlowReads(InMemoryLifecycleStore::new()));
            tracker.start_provisioning().expect("start");

            std::thread::scope(|scope| {
                scope.spawn(|| tracker.on_shutdown().expect("hook"));
                scope.spawn(|| tracker.stop_provisioning().expect("stop"));
            });

            let history = tracker.store().history().expect("read");
            for pair in history.windows(2) {
                if pair[1].state == ProvisioningState::Interrupt {
                    assert_eq!(pair[0].state, ProvisioningState::Started);
                }
            }
        }
    }

    #[test]
    fn shutdown_guard_runs_hook_on_drop() {
        let tracker = Arc::new(tracker());
        tracker.start_provisioning().expect("start");

        drop(ShutdownGuard::new(Arc::clone(&tracker)));

        assert_eq!(
            tracker.current_provisioning_state().expect("read").state,
            ProvisioningState::Interrupt
        );
    }

    #[test]
    fn ensure_not_running_allows_every_other_state() {
        for state in ProvisioningState::ALL {
            let record = LifecycleRecord {
                state,
                ..LifecycleRecord::initial()
            };
            assert_eq!(
                ensure_not_running(&record).is_err(),
                state == ProvisioningState::Started
            );
        }
    }
}
