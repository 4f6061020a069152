//! Types for scene reports and test run summaries.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::{Category, FileSystemLocation, Name, Outcome, ScenarioDetails, Tag, Timestamp};

/// Report of a single scene, as written by the JSON reporter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneReport {
    /// Scenario name
    pub name: Name,

    /// Feature the scenario belongs to
    pub category: Category,

    /// Where the scenario is defined
    pub location: Option<FileSystemLocation>,

    /// Tags attached while the scene ran
    pub tags: Vec<Tag>,

    /// Runner that executed the scene
    pub runner: Option<Name>,

    /// When the scene started (None if the start was never announced)
    pub started_at: Option<Timestamp>,

    /// When the scene finished
    pub finished_at: Option<Timestamp>,

    /// Time between start and finish in milliseconds
    pub duration_ms: Option<i64>,

    /// Final outcome
    pub outcome: Option<Outcome>,
}

impl SceneReport {
    pub fn new(details: &ScenarioDetails) -> Self {
        Self {
            name: details.name.clone(),
            category: details.category.clone(),
            location: details.location.clone(),
            tags: Vec::new(),
            runner: None,
            started_at: None,
            finished_at: None,
            duration_ms: None,
            outcome: None,
        }
    }

    /// Records the final outcome and derives the duration
    pub fn finish(&mut self, outcome: Outcome, at: Timestamp) {
        self.outcome = Some(outcome);
        self.finished_at = Some(at);
        self.duration_ms = self
            .started_at
            .map(|started| (at - started).num_milliseconds());
    }
}

/// Summary of a complete test run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Host the run executed on
    pub host: String,

    /// Runner that executed the scenes
    pub runner: Option<Name>,

    /// First event of the run
    pub started_at: Option<Timestamp>,

    /// When the run finished
    pub finished_at: Option<Timestamp>,

    /// Number of finished scenes
    pub total: usize,

    pub successful: usize,

    /// Scenes that failed an assertion
    pub failed: usize,

    /// Scenes that failed with any other error
    pub errors: usize,

    pub skipped: usize,

    pub ignored: usize,

    /// Scene report files written during the run
    pub reports: Vec<PathBuf>,
}

impl RunSummary {
    /// Counts `outcome` towards the totals
    pub fn count(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::ExecutionSuccessful => self.successful += 1,
            Outcome::ExecutionFailedWithAssertionError(_) => self.failed += 1,
            Outcome::ExecutionFailedWithError(_) => self.errors += 1,
            Outcome::ExecutionSkipped => self.skipped += 1,
            Outcome::ExecutionIgnored => self.ignored += 1,
        }
    }

    /// Scenes that did not succeed because something went wrong
    pub fn failures(&self) -> usize {
        self.failed + self.errors
    }

    pub fn success(&self) -> bool {
        self.failures() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorDetails;
    use chrono::{Duration, Utc};

    #[test]
    fn test_summary_counts_outcomes() {
        let mut summary = RunSummary::default();
        summary.count(&Outcome::ExecutionSuccessful);
        summary.count(&Outcome::ExecutionSkipped);
        summary.count(&Outcome::ExecutionFailedWithAssertionError(
            ErrorDetails::assertion("nope"),
        ));
        summary.count(&Outcome::ExecutionFailedWithError(ErrorDetails::error(
            "Error", "boom",
        )));

        assert_eq!(summary.total, 4);
        assert_eq!(summary.failures(), 2);
        assert!(!summary.success());
    }

    #[test]
    fn test_scene_report_duration() {
        let details = ScenarioDetails::new(Name::new("passes"), Category::new("Feature"), None);
        let mut report = SceneReport::new(&details);
        let started = Utc::now();
        report.started_at = Some(started);

        report.finish(
            Outcome::ExecutionSuccessful,
            started + Duration::milliseconds(250),
        );
        assert_eq!(report.duration_ms, Some(250));
        assert_eq!(report.outcome, Some(Outcome::ExecutionSuccessful));
    }
}
