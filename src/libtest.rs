//! Bridge from the JSON event stream of Rust's built-in test harness.
//!
//! `cargo test -- -Z unstable-options --format json` prints one JSON object per
//! line. This module turns that stream into [`RunnerListener`] calls:
//!
//! | libtest event | listener calls |
//! |---------------|----------------|
//! | `test started` | none; the test is buffered until its result arrives |
//! | `test ok` | `test_began`, `test_passed`, `after_each` |
//! | `test failed` | `test_began`, `test_failed`, `after_each` |
//! | `test ignored` | `test_pending` (test without a body) |
//! | end of stream | `run_finished` |
//!
//! Test paths become suites: `checkout::card::declines` is the test
//! `declines` in suite `card`, nested in suite `checkout`.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::host::{HostError, HostTest, Suite};
use crate::model::{ErrorDetails, TestId};
use crate::reporter::RunnerListener;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to read test events: {0}")]
    Io(#[from] std::io::Error),

    #[error("host contract violated: {0}")]
    Host(#[from] HostError),
}

/// One line of libtest output
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LibtestEvent {
    Suite(SuiteEvent),
    Test(TestEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SuiteEvent {
    pub event: SuiteStatus,
    #[serde(default)]
    pub test_count: Option<usize>,
    #[serde(default)]
    pub passed: Option<usize>,
    #[serde(default)]
    pub failed: Option<usize>,
    #[serde(default)]
    pub ignored: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteStatus {
    Started,
    Ok,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestEvent {
    pub event: TestStatus,
    pub name: String,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Started,
    Ok,
    Failed,
    Ignored,
    Timeout,
    #[serde(other)]
    Unknown,
}

/// Drives a [`RunnerListener`] from libtest events
pub struct LibtestBridge<L> {
    listener: L,
    root: Arc<Suite>,
    suites: HashMap<String, Arc<Suite>>,
    started: HashMap<String, TestId>,
    next_id: u64,
    observed_failures: usize,
    reported_failures: Option<usize>,
}

impl<L: RunnerListener> LibtestBridge<L> {
    pub fn new(listener: L) -> Self {
        Self {
            listener,
            root: Suite::root(),
            suites: HashMap::new(),
            started: HashMap::new(),
            next_id: 1,
            observed_failures: 0,
            reported_failures: None,
        }
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Reads `reader` to the end, then reports the end of the run.
    ///
    /// Returns the number of failed tests.
    pub async fn run<R>(mut self, reader: R) -> BridgeResult<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            self.handle_line(&line).await?;
        }
        Ok(self.finish().await)
    }

    /// Handles one line of output; lines that are not libtest events are skipped
    pub async fn handle_line(&mut self, line: &str) -> BridgeResult<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        match serde_json::from_str::<LibtestEvent>(line) {
            Ok(event) => self.handle(event).await,
            Err(err) => {
                debug!(error = %err, "skipping line that is not a libtest event: {}", line);
                Ok(())
            }
        }
    }

    pub async fn handle(&mut self, event: LibtestEvent) -> BridgeResult<()> {
        match event {
            LibtestEvent::Suite(suite) => {
                self.handle_suite(suite);
                Ok(())
            }
            LibtestEvent::Test(test) => self.handle_test(test).await,
            LibtestEvent::Other => Ok(()),
        }
    }

    /// Reports the end of the run and returns the number of failures
    pub async fn finish(mut self) -> usize {
        for name in self.started.keys() {
            warn!(test = %name, "test started but never finished");
        }

        let failures = self.reported_failures.unwrap_or(self.observed_failures);
        let (tx, rx) = oneshot::channel();
        self.listener
            .run_finished(
                failures,
                Box::new(move |failures| {
                    let _ = tx.send(failures);
                }),
            )
            .await;

        rx.await.unwrap_or(failures)
    }

    fn handle_suite(&mut self, suite: SuiteEvent) {
        match suite.event {
            SuiteStatus::Started => {
                debug!(tests = ?suite.test_count, "suite started");
            }
            SuiteStatus::Ok | SuiteStatus::Failed => {
                debug!(passed = ?suite.passed, failed = ?suite.failed, ignored = ?suite.ignored, "suite finished");
                if let Some(failed) = suite.failed {
                    *self.reported_failures.get_or_insert(0) += failed;
                }
            }
            SuiteStatus::Unknown => {}
        }
    }

    async fn handle_test(&mut self, event: TestEvent) -> BridgeResult<()> {
        match event.event {
            TestStatus::Started => {
                let id = self.allocate_id();
                self.started.insert(event.name, id);
            }
            TestStatus::Ok => {
                let test = self.host_test(&event.name)?.passed();
                self.listener.test_began(&test)?;
                self.listener.test_passed(&test);
                self.listener.after_each(&test).await?;
            }
            TestStatus::Failed => {
                self.observed_failures += 1;
                let error = failure_details(event.stdout.as_deref(), event.message.as_deref());
                let test = self.host_test(&event.name)?.failed(error);
                self.listener.test_began(&test)?;
                self.listener.test_failed(&test);
                self.listener.after_each(&test).await?;
            }
            TestStatus::Ignored => {
                let test = self.host_test(&event.name)?.pending(false);
                self.listener.test_pending(&test)?;
            }
            TestStatus::Timeout => {
                warn!(test = %event.name, "test has been running for a long time");
            }
            TestStatus::Unknown => {
                debug!(test = %event.name, "ignoring unknown test event");
            }
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> TestId {
        let id = TestId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Host test for `name`, consuming its buffered start
    fn host_test(&mut self, name: &str) -> BridgeResult<HostTest> {
        let id = match self.started.remove(name) {
            Some(id) => id,
            None => self.allocate_id(),
        };

        let (path, title, file) = split_test_name(name);
        let parent = self.suite_for(&path);
        let test = HostTest::new(id, title, &parent);

        Ok(match file {
            Some(file) => test.in_file(file),
            None => test,
        })
    }

    fn suite_for(&mut self, path: &[String]) -> Arc<Suite> {
        let mut parent = Arc::clone(&self.root);
        for depth in 1..=path.len() {
            let key = path[..depth].join("::");
            let suite = self
                .suites
                .entry(key)
                .or_insert_with(|| Suite::nested(path[depth - 1].clone(), &parent));
            parent = Arc::clone(suite);
        }
        parent
    }
}

/// Splits a libtest name into suite path, title and (for doc tests) file.
///
/// Doc tests are named `src/lib.rs - module::item (line 12)`.
fn split_test_name(name: &str) -> (Vec<String>, String, Option<PathBuf>) {
    if let Some((file, item)) = name.split_once(" - ") {
        return (vec![file.to_string()], item.to_string(), Some(PathBuf::from(file)));
    }

    let mut segments: Vec<String> = name.split("::").map(str::to_string).collect();
    let title = segments.pop().unwrap_or_default();
    (segments, title, None)
}

/// Error details for a failed test, extracted from its captured output
fn failure_details(stdout: Option<&str>, message: Option<&str>) -> ErrorDetails {
    let output = stdout.unwrap_or_default();
    let (panic_message, location) = panic_message(output);

    let text = panic_message
        .or_else(|| message.map(str::to_string))
        .unwrap_or_else(|| "test failed".to_string());

    let details = if text.starts_with("assertion") {
        ErrorDetails::assertion(text)
    } else {
        ErrorDetails::error("Panic", text)
    };

    match location {
        Some(location) => details.with_stack(location),
        None => details,
    }
}

/// Panic message and location from libtest's captured output.
///
/// Understands both `panicked at src/lib.rs:1:2:\nmessage` and the older
/// `panicked at 'message', src/lib.rs:1:2` layouts.
fn panic_message(output: &str) -> (Option<String>, Option<String>) {
    let mut lines = output.lines();
    let Some(header) = lines.find(|line| line.contains("panicked at ")) else {
        return (None, None);
    };
    let Some((_, rest)) = header.split_once("panicked at ") else {
        return (None, None);
    };

    if let Some(quoted) = rest.strip_prefix('\'') {
        return match quoted.rsplit_once("', ") {
            Some((message, location)) => (Some(message.to_string()), Some(location.to_string())),
            None => (Some(quoted.trim_end_matches('\'').to_string()), None),
        };
    }

    let location = rest.trim_end_matches(':').to_string();
    let message = lines
        .take_while(|line| !line.starts_with("note:"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    let message = if message.is_empty() { None } else { Some(message) };
    (message, Some(location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DomainEvent, ErrorKind, Name, Outcome};
    use crate::reporter::SceneReporter;
    use crate::stage::{EventLog, ManualClock, Stage};
    use chrono::Utc;

    fn bridge() -> (LibtestBridge<SceneReporter>, EventLog) {
        let log = EventLog::new();
        let stage = Arc::new(Stage::new().unwrap().assign(Arc::new(log.clone())));
        let reporter = SceneReporter::on_stage(
            stage,
            Arc::new(ManualClock::frozen(Utc::now())),
            Name::new("libtest"),
        );
        (LibtestBridge::new(reporter), log)
    }

    async fn feed(bridge: &mut LibtestBridge<SceneReporter>, lines: &[&str]) {
        for line in lines {
            bridge.handle_line(line).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_failures_counted_from_events_without_suite_summary() {
        let (mut bridge, log) = bridge();
        feed(
            &mut bridge,
            &[
                r#"{ "type": "test", "event": "started", "name": "math::adds" }"#,
                r#"{ "type": "test", "name": "math::adds", "event": "ok" }"#,
                r#"{ "type": "test", "event": "started", "name": "math::divides" }"#,
                r#"{ "type": "test", "name": "math::divides", "event": "failed", "stdout": "thread 'math::divides' panicked at src/math.rs:4:5:\nattempt to divide by zero\n" }"#,
            ],
        )
        .await;

        assert_eq!(bridge.finish().await, 1);

        let outcomes: Vec<Outcome> = log
            .events()
            .into_iter()
            .filter_map(|event| match event {
                DomainEvent::SceneFinished { outcome, .. } => Some(outcome),
                _ => None,
            })
            .collect();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0], Outcome::ExecutionSuccessful);
        assert_eq!(
            outcomes[1],
            Outcome::ExecutionFailedWithError(
                ErrorDetails::error("Panic", "attempt to divide by zero")
                    .with_stack("src/math.rs:4:5")
            )
        );
        assert_eq!(
            &log.kinds()[log.len() - 2..],
            &["test_run_finishes", "test_run_finished"]
        );
    }

    #[tokio::test]
    async fn test_suite_summary_takes_precedence_over_observed_failures() {
        let (mut bridge, _log) = bridge();
        feed(
            &mut bridge,
            &[
                r#"{ "type": "test", "name": "math::adds", "event": "failed" }"#,
                r#"{ "type": "suite", "event": "failed", "passed": 0, "failed": 2, "ignored": 0 }"#,
                r#"{ "type": "suite", "event": "failed", "passed": 3, "failed": 1, "ignored": 0 }"#,
            ],
        )
        .await;

        assert_eq!(bridge.finish().await, 3);
    }

    #[tokio::test]
    async fn test_timeout_and_unknown_test_events_are_not_reported() {
        let (mut bridge, log) = bridge();
        feed(
            &mut bridge,
            &[
                r#"{ "type": "test", "event": "started", "name": "net::slow" }"#,
                r#"{ "type": "test", "event": "timeout", "name": "net::slow" }"#,
                r#"{ "type": "test", "event": "exploded", "name": "net::slow" }"#,
                "not json at all",
            ],
        )
        .await;
        assert!(log.is_empty());

        // net::slow started but never finished: no scene, no failure
        assert_eq!(bridge.finish().await, 0);
        assert_eq!(log.kinds(), vec!["test_run_finishes", "test_run_finished"]);
    }

    #[tokio::test]
    async fn test_ignored_test_is_skipped() {
        let (mut bridge, log) = bridge();
        feed(
            &mut bridge,
            &[
                r#"{ "type": "test", "event": "started", "name": "search::finds_by_isbn" }"#,
                r#"{ "type": "test", "event": "ignored", "name": "search::finds_by_isbn" }"#,
            ],
        )
        .await;

        match log.events().last() {
            Some(DomainEvent::SceneFinished {
                details, outcome, ..
            }) => {
                assert_eq!(details.category.as_str(), "search");
                assert_eq!(outcome, &Outcome::ExecutionSkipped);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(bridge.finish().await, 0);
    }

    #[test]
    fn test_split_module_path() {
        let (path, title, file) = split_test_name("checkout::card::declines");
        assert_eq!(path, vec!["checkout".to_string(), "card".to_string()]);
        assert_eq!(title, "declines");
        assert_eq!(file, None);

        let (path, title, _) = split_test_name("it_works");
        assert!(path.is_empty());
        assert_eq!(title, "it_works");
    }

    #[test]
    fn test_split_doc_test_name() {
        let (path, title, file) = split_test_name("src/lib.rs - stage (line 12)");
        assert_eq!(path, vec!["src/lib.rs".to_string()]);
        assert_eq!(title, "stage (line 12)");
        assert_eq!(file, Some(PathBuf::from("src/lib.rs")));
    }

    #[test]
    fn test_parse_events() {
        let event: LibtestEvent =
            serde_json::from_str(r#"{ "type": "test", "event": "started", "name": "a::b" }"#)
                .unwrap();
        assert_eq!(
            event,
            LibtestEvent::Test(TestEvent {
                event: TestStatus::Started,
                name: "a::b".to_string(),
                stdout: None,
                message: None,
            })
        );

        let event: LibtestEvent = serde_json::from_str(
            r#"{ "type": "suite", "event": "failed", "passed": 1, "failed": 2, "ignored": 0, "measured": 0, "filtered_out": 0, "exec_time": 0.01 }"#,
        )
        .unwrap();
        match event {
            LibtestEvent::Suite(suite) => {
                assert_eq!(suite.event, SuiteStatus::Failed);
                assert_eq!(suite.failed, Some(2));
            }
            other => panic!("unexpected event {other:?}"),
        }

        let event: LibtestEvent =
            serde_json::from_str(r#"{ "type": "bench", "name": "b", "median": 1, "deviation": 0 }"#)
                .unwrap();
        assert_eq!(event, LibtestEvent::Other);
    }

    #[test]
    fn test_failure_details_modern_layout() {
        let stdout = "\nthread 'math::adds' panicked at src/math.rs:10:9:\nassertion `left == right` failed\n  left: 1\n right: 2\nnote: run with `RUST_BACKTRACE=1` environment variable to display a backtrace\n";
        let details = failure_details(Some(stdout), None);

        assert_eq!(details.kind, ErrorKind::Assertion);
        assert_eq!(
            details.message,
            "assertion `left == right` failed\n  left: 1\n right: 2"
        );
        assert_eq!(details.stack.as_deref(), Some("src/math.rs:10:9"));
    }

    #[test]
    fn test_failure_details_legacy_layout() {
        let stdout = "thread 'io::reads' panicked at 'file not found', src/io.rs:3:5\n";
        let details = failure_details(Some(stdout), None);

        assert_eq!(details.kind, ErrorKind::Error);
        assert_eq!(details.name, "Panic");
        assert_eq!(details.message, "file not found");
        assert_eq!(details.stack.as_deref(), Some("src/io.rs:3:5"));
    }

    #[test]
    fn test_failure_details_without_output() {
        let details = failure_details(None, Some("test did not panic as expected"));
        assert_eq!(details.message, "test did not panic as expected");

        let details = failure_details(None, None);
        assert_eq!(details.message, "test failed");
    }
}
