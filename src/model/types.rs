// Core value types shared by the reporter, the stage and the report writers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Point in time attached to every domain event
pub type Timestamp = DateTime<Utc>;

/// Stable identifier assigned once per host test instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(u64);

impl TestId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "test#{}", self.0)
    }
}

/// Name of a scenario or of a test runner
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Feature a scenario belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a scenario is defined
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileSystemLocation {
    pub path: PathBuf,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl FileSystemLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            line: None,
            column: None,
        }
    }
}

/// Projection of a host test used by every scene event.
///
/// Two events describe the same scene when their details compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioDetails {
    pub name: Name,
    pub category: Category,
    pub location: Option<FileSystemLocation>,
}

impl ScenarioDetails {
    pub fn new(name: Name, category: Category, location: Option<FileSystemLocation>) -> Self {
        Self {
            name,
            category,
            location,
        }
    }
}

/// Labels attached to a scene
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name")]
pub enum Tag {
    /// Derived from the outermost suite enclosing the scenario
    Feature(String),
}

impl Tag {
    pub fn feature(name: impl Into<String>) -> Self {
        Tag::Feature(name.into())
    }
}

/// Distinguishes failed expectations from everything else that went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Assertion,
    Error,
}

/// Serialisable description of an error raised by a test
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub kind: ErrorKind,
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorDetails {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Assertion,
            name: "AssertionError".to_string(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Error,
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn is_assertion(&self) -> bool {
        self.kind == ErrorKind::Assertion
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Result of a scene
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "code", content = "error", rename_all = "snake_case")]
pub enum Outcome {
    ExecutionSuccessful,
    ExecutionFailedWithAssertionError(ErrorDetails),
    ExecutionFailedWithError(ErrorDetails),
    ExecutionSkipped,
    /// The host never reported a state for the test
    ExecutionIgnored,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::ExecutionFailedWithAssertionError(_) | Outcome::ExecutionFailedWithError(_)
        )
    }

    pub fn error(&self) -> Option<&ErrorDetails> {
        match self {
            Outcome::ExecutionFailedWithAssertionError(error)
            | Outcome::ExecutionFailedWithError(error) => Some(error),
            _ => None,
        }
    }

    /// Short label used in logs and run summaries
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::ExecutionSuccessful => "success",
            Outcome::ExecutionFailedWithAssertionError(_) => "failure",
            Outcome::ExecutionFailedWithError(_) => "error",
            Outcome::ExecutionSkipped => "skipped",
            Outcome::ExecutionIgnored => "ignored",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error() {
            Some(error) => write!(f, "{} ({})", self.label(), error),
            None => f.write_str(self.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_failure_classification() {
        assert!(!Outcome::ExecutionSuccessful.is_failure());
        assert!(!Outcome::ExecutionSkipped.is_failure());
        assert!(Outcome::ExecutionFailedWithError(ErrorDetails::error("Error", "boom")).is_failure());
        assert!(
            Outcome::ExecutionFailedWithAssertionError(ErrorDetails::assertion("nope")).is_failure()
        );
    }

    #[test]
    fn test_outcome_display_includes_error() {
        let outcome = Outcome::ExecutionFailedWithAssertionError(ErrorDetails::assertion(
            "expected 1 to equal 2",
        ));
        assert_eq!(
            outcome.to_string(),
            "failure (AssertionError: expected 1 to equal 2)"
        );
        assert_eq!(Outcome::ExecutionSkipped.to_string(), "skipped");
    }

    #[test]
    fn test_outcome_serializes_with_code() {
        let json = serde_json::to_value(Outcome::ExecutionSuccessful).unwrap();
        assert_eq!(json, serde_json::json!({ "code": "execution_successful" }));

        let json = serde_json::to_value(Outcome::ExecutionFailedWithError(ErrorDetails::error(
            "TypeError",
            "undefined",
        )))
        .unwrap();
        assert_eq!(json["code"], "execution_failed_with_error");
        assert_eq!(json["error"]["message"], "undefined");
        assert!(json["error"].get("stack").is_none());
    }
}
