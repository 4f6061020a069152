//! Domain events announced on the stage.
//!
//! Every event is an immutable record carrying the time it was created at.
//! Scene events identify their scene through [`ScenarioDetails`].

use serde::{Deserialize, Serialize};

use super::types::{Name, Outcome, ScenarioDetails, Tag, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    SceneStarts {
        details: ScenarioDetails,
        timestamp: Timestamp,
    },
    SceneTagged {
        details: ScenarioDetails,
        tag: Tag,
        timestamp: Timestamp,
    },
    TestRunnerDetected {
        name: Name,
        timestamp: Timestamp,
    },
    SceneFinishes {
        details: ScenarioDetails,
        timestamp: Timestamp,
    },
    SceneFinished {
        details: ScenarioDetails,
        outcome: Outcome,
        timestamp: Timestamp,
    },
    TestRunFinishes {
        timestamp: Timestamp,
    },
    TestRunFinished {
        timestamp: Timestamp,
    },
}

impl DomainEvent {
    pub fn timestamp(&self) -> Timestamp {
        match self {
            DomainEvent::SceneStarts { timestamp, .. }
            | DomainEvent::SceneTagged { timestamp, .. }
            | DomainEvent::TestRunnerDetected { timestamp, .. }
            | DomainEvent::SceneFinishes { timestamp, .. }
            | DomainEvent::SceneFinished { timestamp, .. }
            | DomainEvent::TestRunFinishes { timestamp }
            | DomainEvent::TestRunFinished { timestamp } => *timestamp,
        }
    }

    /// The scene this event describes, if it is a scene event
    pub fn details(&self) -> Option<&ScenarioDetails> {
        match self {
            DomainEvent::SceneStarts { details, .. }
            | DomainEvent::SceneTagged { details, .. }
            | DomainEvent::SceneFinishes { details, .. }
            | DomainEvent::SceneFinished { details, .. } => Some(details),
            _ => None,
        }
    }

    /// Stable snake_case name of the event kind, as used in serialised form
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::SceneStarts { .. } => "scene_starts",
            DomainEvent::SceneTagged { .. } => "scene_tagged",
            DomainEvent::TestRunnerDetected { .. } => "test_runner_detected",
            DomainEvent::SceneFinishes { .. } => "scene_finishes",
            DomainEvent::SceneFinished { .. } => "scene_finished",
            DomainEvent::TestRunFinishes { .. } => "test_run_finishes",
            DomainEvent::TestRunFinished { .. } => "test_run_finished",
        }
    }
}
