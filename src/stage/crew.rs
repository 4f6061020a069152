//! Crew members: consumers of the events announced on the stage.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::model::DomainEvent;

/// Asynchronous follow-up work a crew member hands back to the stage
pub type PendingWork = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Receives every event announced on the stage it is assigned to
pub trait StageCrewMember: Send + Sync {
    /// Reacts to `event`. Work returned here must finish before the next cue.
    fn notify_of(&self, event: &DomainEvent) -> Option<PendingWork>;
}

/// Keeps every announced event in memory
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(DomainEvent::kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StageCrewMember for EventLog {
    fn notify_of(&self, event: &DomainEvent) -> Option<PendingWork> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        None
    }
}

/// Logs scene progress through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl StageCrewMember for ConsoleReporter {
    fn notify_of(&self, event: &DomainEvent) -> Option<PendingWork> {
        match event {
            DomainEvent::SceneStarts { details, .. } => {
                info!(feature = %details.category, "scene starts: {}", details.name);
            }
            DomainEvent::SceneFinished {
                details, outcome, ..
            } if outcome.is_failure() => {
                warn!(feature = %details.category, "scene {}: {}", details.name, outcome);
            }
            DomainEvent::SceneFinished {
                details, outcome, ..
            } => {
                info!(feature = %details.category, "scene {}: {}", details.name, outcome);
            }
            DomainEvent::TestRunnerDetected { name, .. } => {
                debug!(runner = %name, "test runner detected");
            }
            DomainEvent::TestRunFinished { .. } => info!("test run finished"),
            _ => {}
        }
        None
    }
}
