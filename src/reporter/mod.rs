pub mod recorder;
pub mod translator;

pub use recorder::OutcomeRecorder;
pub use translator::{CompletionCallback, RunnerListener, SceneReporter};
