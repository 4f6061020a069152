//! Screenplay Reporter - test runner events as screenplay domain events.
//!
//! This crate provides:
//! - A scene reporter translating host test runner lifecycle events into
//!   domain events, with an outcome recorder keyed by test identity
//! - A stage that delivers events to crew members (console, JSON reports) and
//!   lets the reporter wait for their asynchronous work to settle
//! - A bridge from the JSON event stream of Rust's built-in test harness
//! - Screenplay questions for reading text out of web pages
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use screenplay_reporter::{EventLog, HostTest, Name, RunnerListener, SceneReporter, Stage, Suite, SystemClock, TestId};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let log = EventLog::new();
//! let stage = Arc::new(Stage::new()?.assign(Arc::new(log.clone())));
//! let mut reporter = SceneReporter::on_stage(stage, Arc::new(SystemClock), Name::new("libtest"));
//!
//! let root = Suite::root();
//! let feature = Suite::nested("Checkout", &root);
//! let test = HostTest::new(TestId::new(1), "pays by card", &feature).passed();
//!
//! reporter.test_began(&test)?;
//! reporter.test_passed(&test);
//! reporter.after_each(&test).await?;
//! assert_eq!(log.len(), 5);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod host;
pub mod libtest;
pub mod model;
pub mod reporter;
pub mod runner;
pub mod screenplay;
pub mod session;
pub mod stage;

// Re-export domain model
pub use model::{
    Category, DomainEvent, ErrorDetails, ErrorKind, FileSystemLocation, Name, Outcome,
    ScenarioDetails, Tag, TestId, Timestamp,
};

// Re-export host runner model
pub use host::{HostError, HostResult, HostTest, OutcomeMapper, Suite, TestMapper, TestState};

// Re-export the reporter
pub use reporter::{CompletionCallback, OutcomeRecorder, RunnerListener, SceneReporter};

// Re-export the stage and its crew
pub use stage::{
    Announcer, Clock, ConsoleReporter, Cue, EventLog, JsonReporter, ManualClock, PendingWork,
    Stage, StageCrewMember, StageError, SystemClock,
};

// Re-export report types
pub use runner::{RunSummary, SceneReport};

// Re-export the libtest bridge
pub use libtest::{BridgeError, BridgeResult, LibtestBridge, LibtestEvent};

// Re-export session management
pub use session::{Session, cleanup_old_sessions, list_sessions};
