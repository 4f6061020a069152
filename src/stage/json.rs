//! Crew member writing scene reports and a run summary as JSON files.

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

use super::crew::{PendingWork, StageCrewMember};
use crate::model::{DomainEvent, Name, ScenarioDetails};
use crate::runner::{RunSummary, SceneReport};
use crate::session::sanitize_name;

/// File name of the run summary inside the output directory
pub const RUN_SUMMARY_FILE: &str = "run.json";

#[derive(Debug, Default)]
struct ReportBook {
    scenes: HashMap<ScenarioDetails, SceneReport>,
    runner: Option<Name>,
    summary: RunSummary,
}

/// Writes one JSON file per finished scene and `run.json` when the run ends.
///
/// Files are written asynchronously; the stage's next cue waits for them.
#[derive(Debug)]
pub struct JsonReporter {
    output_dir: PathBuf,
    book: Mutex<ReportBook>,
}

impl JsonReporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            book: Mutex::new(ReportBook::default()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Summary of the scenes finished so far
    pub fn summary(&self) -> RunSummary {
        self.book().summary.clone()
    }

    fn book(&self) -> MutexGuard<'_, ReportBook> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn scene_path(&self, sequence: usize, details: &ScenarioDetails) -> PathBuf {
        self.output_dir.join(format!(
            "{:04}_{}_{}.json",
            sequence,
            sanitize_name(details.category.as_str()),
            sanitize_name(details.name.as_str())
        ))
    }
}

impl StageCrewMember for JsonReporter {
    fn notify_of(&self, event: &DomainEvent) -> Option<PendingWork> {
        let mut book = self.book();
        book.summary.started_at.get_or_insert(event.timestamp());

        match event {
            DomainEvent::SceneStarts { details, timestamp } => {
                let runner = book.runner.clone();
                let report = book
                    .scenes
                    .entry(details.clone())
                    .or_insert_with(|| SceneReport::new(details));
                report.started_at = Some(*timestamp);
                report.runner = report.runner.take().or(runner);
                None
            }
            DomainEvent::SceneTagged { details, tag, .. } => {
                let report = book
                    .scenes
                    .entry(details.clone())
                    .or_insert_with(|| SceneReport::new(details));
                if !report.tags.contains(tag) {
                    report.tags.push(tag.clone());
                }
                None
            }
            DomainEvent::TestRunnerDetected { name, .. } => {
                book.runner = Some(name.clone());
                for report in book.scenes.values_mut() {
                    report.runner.get_or_insert_with(|| name.clone());
                }
                None
            }
            DomainEvent::SceneFinishes { .. } => None,
            DomainEvent::SceneFinished {
                details,
                outcome,
                timestamp,
            } => {
                let mut report = book
                    .scenes
                    .remove(details)
                    .unwrap_or_else(|| SceneReport::new(details));
                if report.runner.is_none() {
                    report.runner = book.runner.clone();
                }
                report.finish(outcome.clone(), *timestamp);

                book.summary.count(outcome);
                let path = self.scene_path(book.summary.total, details);
                book.summary.reports.push(path.clone());

                debug!(path = %path.display(), "writing scene report");
                write_json(path, &report)
            }
            DomainEvent::TestRunFinishes { .. } => None,
            DomainEvent::TestRunFinished { timestamp } => {
                let runner = book.runner.clone();
                let summary = &mut book.summary;
                summary.finished_at = Some(*timestamp);
                summary.runner = runner;
                summary.host = host_name();

                write_json(self.output_dir.join(RUN_SUMMARY_FILE), summary)
            }
        }
    }
}

fn write_json<T: Serialize>(path: PathBuf, value: &T) -> Option<PendingWork> {
    let bytes = match serde_json::to_vec_pretty(value) {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to serialize report");
            return None;
        }
    };

    Some(Box::pin(async move {
        if let Some(parent) = path.parent() {
            if let Err(err) = tokio::fs::create_dir_all(parent).await {
                error!(path = %parent.display(), error = %err, "failed to create report directory");
                return;
            }
        }
        if let Err(err) = tokio::fs::write(&path, bytes).await {
            error!(path = %path.display(), error = %err, "failed to write report");
        }
    }))
}

fn host_name() -> String {
    hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}
