pub mod events;
pub mod types;

pub use events::DomainEvent;
pub use types::{
    Category, ErrorDetails, ErrorKind, FileSystemLocation, Name, Outcome, ScenarioDetails, Tag,
    TestId, Timestamp,
};
