use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::model::{ErrorDetails, TestId};

/// A suite in the host runner's tree.
///
/// Suites link to their parent, so a test can walk up to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    /// Title of the suite ("" for the root suite)
    pub title: String,

    /// Whether this is the runner's root suite
    pub root: bool,

    /// Source file the suite was declared in
    pub file: Option<PathBuf>,

    /// Enclosing suite (None for the root suite)
    pub parent: Option<Arc<Suite>>,
}

impl Suite {
    /// The runner's root suite
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            title: String::new(),
            root: true,
            file: None,
            parent: None,
        })
    }

    /// A suite nested in `parent`
    pub fn nested(title: impl Into<String>, parent: &Arc<Suite>) -> Arc<Self> {
        Arc::new(Self {
            title: title.into(),
            root: false,
            file: None,
            parent: Some(Arc::clone(parent)),
        })
    }

    /// A suite nested in `parent`, declared in `file`
    pub fn nested_in_file(
        title: impl Into<String>,
        file: impl Into<PathBuf>,
        parent: &Arc<Suite>,
    ) -> Arc<Self> {
        Arc::new(Self {
            title: title.into(),
            root: false,
            file: Some(file.into()),
            parent: Some(Arc::clone(parent)),
        })
    }

    /// Iterate from this suite up to (and including) the root
    pub fn ancestry(self: &Arc<Self>) -> impl Iterator<Item = &Suite> {
        std::iter::successors(Some(self.as_ref()), |&suite| suite.parent.as_deref())
    }
}

/// State the host runner reported for a finished test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestState {
    Passed,
    Failed(ErrorDetails),
}

/// A test as seen by the host runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTest {
    /// Identifier assigned once when the host created the test
    pub id: TestId,

    /// Title of the test itself, without enclosing suites
    pub title: String,

    /// Source file the test was declared in
    pub file: Option<PathBuf>,

    /// Enclosing suite
    pub parent: Option<Arc<Suite>>,

    /// State reported by the host (None until the test ran)
    pub state: Option<TestState>,

    /// Whether the host marked the test as pending
    pub pending: bool,

    /// Whether the test has a body to execute
    pub has_body: bool,

    /// Test the host considers current when reporting on this one
    pub current_test: Option<TestId>,
}

impl HostTest {
    pub fn new(id: TestId, title: impl Into<String>, parent: &Arc<Suite>) -> Self {
        Self {
            id,
            title: title.into(),
            file: None,
            parent: Some(Arc::clone(parent)),
            state: None,
            pending: false,
            has_body: true,
            current_test: None,
        }
    }

    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn passed(mut self) -> Self {
        self.state = Some(TestState::Passed);
        self
    }

    pub fn failed(mut self, error: ErrorDetails) -> Self {
        self.state = Some(TestState::Failed(error));
        self
    }

    /// Marks the test pending; a pending test without a body is never run
    pub fn pending(mut self, has_body: bool) -> Self {
        self.pending = true;
        self.has_body = has_body;
        self
    }

    /// Key under which the outcome of this test is recorded
    pub fn recording_key(&self) -> TestId {
        self.current_test.unwrap_or(self.id)
    }

    /// Source file of the test, or of the nearest suite that declares one
    pub fn source_file(&self) -> Option<&Path> {
        self.file.as_deref().or_else(|| {
            self.parent
                .as_ref()?
                .ancestry()
                .find_map(|suite| suite.file.as_deref())
        })
    }
}

/// Result type for host contract checks
pub type HostResult<T> = Result<T, HostError>;

/// Violations of the contract the host runner is expected to honour
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("test '{title}' ({id}) is not attached to any suite")]
    MissingParent { id: TestId, title: String },
}
