//! Projections from host tests to the domain model.

use std::sync::Arc;

use crate::host::types::{HostError, HostResult, HostTest, Suite, TestState};
use crate::model::{Category, FileSystemLocation, Name, Outcome, ScenarioDetails};

/// Derives scenario details from host tests
#[derive(Debug, Clone, Copy, Default)]
pub struct TestMapper;

impl TestMapper {
    pub fn new() -> Self {
        Self
    }

    /// Scenario details for `test`. Pure: equal tests give equal details.
    pub fn details_of(&self, test: &HostTest) -> HostResult<ScenarioDetails> {
        let feature = self.feature_name_for(test)?;

        Ok(ScenarioDetails::new(
            Name::new(test.title.clone()),
            Category::new(feature),
            test.source_file().map(FileSystemLocation::new),
        ))
    }

    /// Title of the outermost non-root suite enclosing `test`.
    ///
    /// Tests declared directly in the root suite fall back to their file
    /// stem, then to their own title.
    pub fn feature_name_for(&self, test: &HostTest) -> HostResult<String> {
        let parent = parent_of(test)?;

        let outermost = parent
            .ancestry()
            .filter(|suite| !suite.root)
            .last()
            .map(|suite| suite.title.clone());

        Ok(outermost.unwrap_or_else(|| {
            test.source_file()
                .and_then(|file| file.file_stem())
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| test.title.clone())
        }))
    }
}

/// Derives outcomes from the state the host reported
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeMapper;

impl OutcomeMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn outcome_of(&self, test: &HostTest) -> Outcome {
        if test.pending {
            return Outcome::ExecutionSkipped;
        }

        match &test.state {
            Some(TestState::Passed) => Outcome::ExecutionSuccessful,
            Some(TestState::Failed(error)) if error.is_assertion() => {
                Outcome::ExecutionFailedWithAssertionError(error.clone())
            }
            Some(TestState::Failed(error)) => Outcome::ExecutionFailedWithError(error.clone()),
            None => Outcome::ExecutionIgnored,
        }
    }
}

fn parent_of(test: &HostTest) -> HostResult<&Arc<Suite>> {
    test.parent.as_ref().ok_or_else(|| HostError::MissingParent {
        id: test.id,
        title: test.title.clone(),
    })
}
