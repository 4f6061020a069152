//! Screenplay-style questions and assertions for web pages.
//!
//! Questions are plain descriptions of what to ask; the actor's
//! [`BrowseTheWeb`] ability resolves them against the live page when an
//! activity such as [`Ensure`] needs the answer.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use screenplay_reporter::screenplay::{
//!     equals, Actor, BrowseTheWeb, By, Ensure, Navigate, Target, Text,
//! };
//!
//! # async fn demo(browser: Arc<dyn BrowseTheWeb>) -> Result<(), Box<dyn std::error::Error>> {
//! let header = Target::the("header").located(By::tag_name("h1"));
//! let bernie = Actor::named("Bernie").who_can(browser);
//!
//! bernie
//!     .attempts_to(&[
//!         &Navigate::to("https://example.org"),
//!         &Ensure::that(Text::of(&header), equals("Hello World!".to_string())),
//!     ])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod ensure;
pub mod questions;
pub mod target;

use thiserror::Error;

use crate::model::ErrorDetails;

pub use actor::{Activity, Actor, BrowseTheWeb, BrowserError, Navigate};
pub use ensure::{Ensure, Expectation, equals};
pub use questions::{Question, Text, TextOf, TextOfAll};
pub use target::{By, Locator, Target, TargetElement, TargetElements};

/// Result type for screenplay activities and questions
pub type ScreenplayResult<T> = Result<T, ScreenplayError>;

#[derive(Debug, Error)]
pub enum ScreenplayError {
    #[error("{actor} does not have the ability to {ability}")]
    MissingAbility { actor: String, ability: &'static str },

    #[error("{subject}: {source}")]
    Browser {
        subject: String,
        #[source]
        source: BrowserError,
    },

    #[error("{message}")]
    Assertion { message: String },
}

impl ScreenplayError {
    pub fn is_assertion(&self) -> bool {
        matches!(self, ScreenplayError::Assertion { .. })
    }
}

impl From<&ScreenplayError> for ErrorDetails {
    fn from(err: &ScreenplayError) -> Self {
        match err {
            ScreenplayError::Assertion { message } => ErrorDetails::assertion(message.clone()),
            ScreenplayError::MissingAbility { .. } => {
                ErrorDetails::error("ConfigurationError", err.to_string())
            }
            ScreenplayError::Browser { .. } => ErrorDetails::error("BrowserError", err.to_string()),
        }
    }
}

impl From<ScreenplayError> for ErrorDetails {
    fn from(err: ScreenplayError) -> Self {
        ErrorDetails::from(&err)
    }
}
