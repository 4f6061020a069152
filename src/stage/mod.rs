//! The stage: where domain events are announced and consumed.
//!
//! This module provides:
//! - [`Clock`] implementations used to timestamp events
//! - The [`Announcer`] and [`Cue`] seams the reporter depends on
//! - [`Stage`], an in-process event bus that delivers events to crew members
//!   and tracks the asynchronous work they schedule
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use screenplay_reporter::stage::{Announcer, Cue, EventLog, Stage};
//! use screenplay_reporter::model::DomainEvent;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let log = EventLog::new();
//! let stage = Stage::new()?.assign(Arc::new(log.clone()));
//! stage.announce(DomainEvent::TestRunFinishes { timestamp: chrono::Utc::now() });
//! stage.wait_for_next_cue().await;
//! assert_eq!(log.kinds(), vec!["test_run_finishes"]);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod crew;
pub mod json;

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::model::DomainEvent;

pub use clock::{Clock, ManualClock, SystemClock};
pub use crew::{ConsoleReporter, EventLog, PendingWork, StageCrewMember};
pub use json::JsonReporter;

/// Accepts domain events in the order they are announced
pub trait Announcer: Send + Sync {
    fn announce(&self, event: DomainEvent);

    /// Announces an ordered batch of events
    fn announce_all(&self, events: Vec<DomainEvent>) {
        for event in events {
            self.announce(event);
        }
    }
}

/// Barrier resolving once previously scheduled asynchronous work has settled
#[async_trait]
pub trait Cue: Send + Sync {
    async fn wait_for_next_cue(&self);
}

/// Result type for stage operations
pub type StageResult<T> = Result<T, StageError>;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("the stage must be created from within a Tokio runtime")]
    NoRuntime,
}

/// In-process event bus.
///
/// Events are delivered synchronously to every crew member, in assignment
/// order. Follow-up work returned by crew members is spawned on the runtime
/// the stage was built with and awaited by [`Cue::wait_for_next_cue`].
pub struct Stage {
    crew: Vec<Arc<dyn StageCrewMember>>,
    runtime: Handle,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Stage {
    /// Stage bound to the current Tokio runtime
    pub fn new() -> StageResult<Self> {
        let runtime = Handle::try_current().map_err(|_| StageError::NoRuntime)?;
        Ok(Self::with_runtime(runtime))
    }

    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            crew: Vec::new(),
            runtime,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Adds a crew member that will be notified of every subsequent event
    pub fn assign(mut self, member: Arc<dyn StageCrewMember>) -> Self {
        self.crew.push(member);
        self
    }

    /// Number of spawned tasks the next cue will wait for
    pub fn pending_work(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("crew", &self.crew.len())
            .field("pending", &self.pending_work())
            .finish()
    }
}

impl Announcer for Stage {
    fn announce(&self, event: DomainEvent) {
        debug!(kind = event.kind(), "announcing");

        for member in &self.crew {
            if let Some(work) = member.notify_of(&event) {
                let handle = self.runtime.spawn(work);
                self.lock_pending().push(handle);
            }
        }
    }
}

#[async_trait]
impl Cue for Stage {
    async fn wait_for_next_cue(&self) {
        // Work may schedule more work while we wait, so drain until empty.
        loop {
            let batch = std::mem::take(&mut *self.lock_pending());
            if batch.is_empty() {
                break;
            }

            debug!(tasks = batch.len(), "waiting for crew work to settle");
            for handle in batch {
                if let Err(err) = handle.await {
                    warn!(error = %err, "crew work did not complete");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowCounter {
        done: Arc<AtomicUsize>,
    }

    impl StageCrewMember for SlowCounter {
        fn notify_of(&self, _event: &DomainEvent) -> Option<PendingWork> {
            let done = Arc::clone(&self.done);
            Some(Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                done.fetch_add(1, Ordering::SeqCst);
            }))
        }
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        assert!(matches!(Stage::new(), Err(StageError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_delivers_in_order_to_all_crew() {
        let first = EventLog::new();
        let second = EventLog::new();
        let stage = Stage::new()
            .unwrap()
            .assign(Arc::new(first.clone()))
            .assign(Arc::new(second.clone()));

        let now = Utc::now();
        stage.announce_all(vec![
            DomainEvent::TestRunFinishes { timestamp: now },
            DomainEvent::TestRunFinished { timestamp: now },
        ]);

        assert_eq!(first.kinds(), vec!["test_run_finishes", "test_run_finished"]);
        assert_eq!(second.kinds(), first.kinds());
    }

    #[tokio::test]
    async fn test_cue_waits_for_crew_work() {
        let done = Arc::new(AtomicUsize::new(0));
        let stage = Stage::new().unwrap().assign(Arc::new(SlowCounter {
            done: Arc::clone(&done),
        }));

        stage.announce(DomainEvent::TestRunFinishes {
            timestamp: Utc::now(),
        });
        stage.announce(DomainEvent::TestRunFinished {
            timestamp: Utc::now(),
        });
        assert_eq!(stage.pending_work(), 2);

        stage.wait_for_next_cue().await;
        assert_eq!(done.load(Ordering::SeqCst), 2);
        assert_eq!(stage.pending_work(), 0);
    }

    #[tokio::test]
    async fn test_cue_resolves_immediately_without_work() {
        let stage = Stage::new().unwrap();
        stage.wait_for_next_cue().await;
        assert_eq!(stage.pending_work(), 0);
    }
}
