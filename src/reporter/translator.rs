use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::recorder::OutcomeRecorder;
use crate::host::{HostResult, HostTest, OutcomeMapper, TestMapper};
use crate::model::{DomainEvent, Name, Outcome, ScenarioDetails, Tag};
use crate::stage::{Announcer, Clock, Cue, Stage};

/// Invoked with the number of failures once the run has been reported
pub type CompletionCallback = Box<dyn FnOnce(usize) + Send>;

/// Lifecycle events a host test runner delivers to its reporter.
///
/// The host calls these sequentially; no two handlers run at the same time.
#[async_trait]
pub trait RunnerListener: Send {
    /// A test is about to run
    fn test_began(&mut self, test: &HostTest) -> HostResult<()>;

    /// A test passed
    fn test_passed(&mut self, test: &HostTest);

    /// A test failed; the failure is read from the test's state
    fn test_failed(&mut self, test: &HostTest);

    /// A test was marked pending
    fn test_pending(&mut self, test: &HostTest) -> HostResult<()>;

    /// The host's after-each hook fired for `test`
    async fn after_each(&mut self, test: &HostTest) -> HostResult<()>;

    /// The whole run completed with `failures` failed tests
    async fn run_finished(&mut self, failures: usize, done: CompletionCallback);
}

/// Translates host runner lifecycle events into domain events.
///
/// Outcomes reported through pass/fail are held in an [`OutcomeRecorder`]
/// until the scene is finished, after the cue following `SceneFinishes`.
pub struct SceneReporter {
    announcer: Arc<dyn Announcer>,
    clock: Arc<dyn Clock>,
    cue: Arc<dyn Cue>,
    runner: Name,
    test_mapper: TestMapper,
    outcome_mapper: OutcomeMapper,
    recorder: OutcomeRecorder,
}

impl SceneReporter {
    pub fn new(
        announcer: Arc<dyn Announcer>,
        clock: Arc<dyn Clock>,
        cue: Arc<dyn Cue>,
        runner: Name,
    ) -> Self {
        Self {
            announcer,
            clock,
            cue,
            runner,
            test_mapper: TestMapper::new(),
            outcome_mapper: OutcomeMapper::new(),
            recorder: OutcomeRecorder::new(),
        }
    }

    /// Reporter announcing on `stage` and waiting for its cues
    pub fn on_stage(stage: Arc<Stage>, clock: Arc<dyn Clock>, runner: Name) -> Self {
        let cue: Arc<dyn Cue> = Arc::clone(&stage) as Arc<dyn Cue>;
        Self::new(stage, clock, cue, runner)
    }

    pub fn recorder(&self) -> &OutcomeRecorder {
        &self.recorder
    }

    fn announce_scene_starts(&self, scenario: &ScenarioDetails) {
        self.emit(vec![
            DomainEvent::SceneStarts {
                details: scenario.clone(),
                timestamp: self.clock.now(),
            },
            DomainEvent::SceneTagged {
                details: scenario.clone(),
                tag: Tag::feature(scenario.category.as_str()),
                timestamp: self.clock.now(),
            },
            DomainEvent::TestRunnerDetected {
                name: self.runner.clone(),
                timestamp: self.clock.now(),
            },
        ]);
    }

    fn announce_scene_skipped(&self, test: &HostTest) -> HostResult<()> {
        let scenario = self.test_mapper.details_of(test)?;
        self.announce_scene_starts(&scenario);

        self.emit(vec![
            DomainEvent::SceneFinishes {
                details: scenario.clone(),
                timestamp: self.clock.now(),
            },
            DomainEvent::SceneFinished {
                details: scenario,
                outcome: Outcome::ExecutionSkipped,
                timestamp: self.clock.now(),
            },
        ]);
        Ok(())
    }

    fn record(&mut self, test: &HostTest) {
        let outcome = self.outcome_mapper.outcome_of(test);
        debug!(test = %test.id, outcome = outcome.label(), "recording outcome");
        self.recorder.finished(test.recording_key(), outcome);
    }

    fn emit(&self, events: Vec<DomainEvent>) {
        self.announcer.announce_all(events);
    }
}

#[async_trait]
impl RunnerListener for SceneReporter {
    fn test_began(&mut self, test: &HostTest) -> HostResult<()> {
        let scenario = self.test_mapper.details_of(test)?;
        self.recorder.started(test.recording_key());
        self.announce_scene_starts(&scenario);
        Ok(())
    }

    fn test_passed(&mut self, test: &HostTest) {
        self.record(test);
    }

    fn test_failed(&mut self, test: &HostTest) {
        self.record(test);
    }

    fn test_pending(&mut self, test: &HostTest) -> HostResult<()> {
        // Only bodiless tests skip the after-each hook.
        if test.has_body {
            debug!(test = %test.id, "pending test has a body, waiting for after-each");
            return Ok(());
        }
        self.announce_scene_skipped(test)
    }

    async fn after_each(&mut self, test: &HostTest) -> HostResult<()> {
        let scenario = self.test_mapper.details_of(test)?;
        let key = test.recording_key();

        self.emit(vec![DomainEvent::SceneFinishes {
            details: scenario.clone(),
            timestamp: self.clock.now(),
        }]);

        self.cue.wait_for_next_cue().await;

        // A missing outcome means the finish was observed before pass/fail.
        let outcome = match self.recorder.outcome_of(key) {
            Some(outcome) => outcome.clone(),
            None => {
                warn!(test = %test.id, scene = %scenario.name, "no outcome recorded, deriving one from the test state");
                self.outcome_mapper.outcome_of(test)
            }
        };

        self.emit(vec![DomainEvent::SceneFinished {
            details: scenario,
            outcome,
            timestamp: self.clock.now(),
        }]);

        self.recorder.erase(key);
        Ok(())
    }

    async fn run_finished(&mut self, failures: usize, done: CompletionCallback) {
        self.emit(vec![DomainEvent::TestRunFinishes {
            timestamp: self.clock.now(),
        }]);

        self.cue.wait_for_next_cue().await;

        self.emit(vec![DomainEvent::TestRunFinished {
            timestamp: self.clock.now(),
        }]);

        done(failures);
    }
}
