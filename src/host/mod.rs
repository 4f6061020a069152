pub mod mapper;
pub mod types;

pub use mapper::{OutcomeMapper, TestMapper};
pub use types::{HostError, HostResult, HostTest, Suite, TestState};
