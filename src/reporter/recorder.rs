use std::collections::HashMap;

use crate::model::{Outcome, TestId};

/// Side table of the last known outcome of every in-flight test.
///
/// Entries are created by [`started`](Self::started), filled by
/// [`finished`](Self::finished) and removed by [`erase`](Self::erase). An entry
/// that is finished but never erased stays in the table.
#[derive(Debug, Default)]
pub struct OutcomeRecorder {
    outcomes: HashMap<TestId, Option<Outcome>>,
}

impl OutcomeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `test` as in flight, discarding any outcome left from an earlier attempt
    pub fn started(&mut self, test: TestId) {
        self.outcomes.insert(test, None);
    }

    /// Records `outcome` for `test`, replacing any earlier one
    pub fn finished(&mut self, test: TestId, outcome: Outcome) {
        self.outcomes.insert(test, Some(outcome));
    }

    pub fn outcome_of(&self, test: TestId) -> Option<&Outcome> {
        self.outcomes.get(&test).and_then(Option::as_ref)
    }

    pub fn erase(&mut self, test: TestId) {
        self.outcomes.remove(&test);
    }

    /// Number of tests currently tracked
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
