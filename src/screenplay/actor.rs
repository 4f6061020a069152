use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::target::Locator;
use super::{ScreenplayError, ScreenplayResult};

/// Errors reported by a browser driver
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrowserError {
    #[error("no element matches {0}")]
    NoSuchElement(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("driver error: {0}")]
    Driver(String),
}

/// Ability to interact with a web browser.
///
/// Implemented by the automation driver; questions resolve locators through it
/// at the moment they are answered.
#[async_trait]
pub trait BrowseTheWeb: Send + Sync {
    async fn navigate_to(&self, url: &str) -> Result<(), BrowserError>;

    /// Text content of the first element matching `locator`
    async fn text_of(&self, locator: &Locator) -> Result<String, BrowserError>;

    /// Text content of every element matching `locator`, in document order
    async fn texts_of_all(&self, locator: &Locator) -> Result<Vec<String>, BrowserError>;
}

/// Something an actor can do
#[async_trait]
pub trait Activity: fmt::Display + Send + Sync {
    async fn perform_as(&self, actor: &Actor) -> ScreenplayResult<()>;
}

/// Someone interacting with the system under test
#[derive(Clone)]
pub struct Actor {
    name: String,
    browser: Option<Arc<dyn BrowseTheWeb>>,
}

impl Actor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            browser: None,
        }
    }

    /// Gives the actor a browser to work with
    pub fn who_can(mut self, browser: Arc<dyn BrowseTheWeb>) -> Self {
        self.browser = Some(browser);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn browser(&self) -> ScreenplayResult<&dyn BrowseTheWeb> {
        self.browser
            .as_deref()
            .ok_or_else(|| ScreenplayError::MissingAbility {
                actor: self.name.clone(),
                ability: "BrowseTheWeb",
            })
    }

    /// Performs `activities` in order, stopping at the first failure
    pub async fn attempts_to(&self, activities: &[&dyn Activity]) -> ScreenplayResult<()> {
        for activity in activities {
            debug!(actor = %self.name, "attempts to {}", activity);
            activity.perform_as(self).await?;
        }
        Ok(())
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("name", &self.name)
            .field("can_browse", &self.browser.is_some())
            .finish()
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Opens a page in the actor's browser
#[derive(Debug, Clone)]
pub struct Navigate {
    url: String,
}

impl Navigate {
    pub fn to(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl fmt::Display for Navigate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "navigate to {}", self.url)
    }
}

#[async_trait]
impl Activity for Navigate {
    async fn perform_as(&self, actor: &Actor) -> ScreenplayResult<()> {
        actor
            .browser()?
            .navigate_to(&self.url)
            .await
            .map_err(|source| ScreenplayError::Browser {
                subject: format!("could not {}", self),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_actor_without_browser_cannot_navigate() {
        let actor = Actor::named("Bernie");
        let err = actor
            .attempts_to(&[&Navigate::to("https://example.org")])
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Bernie does not have the ability to BrowseTheWeb"
        );
    }
}
