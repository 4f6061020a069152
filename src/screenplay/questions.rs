//! Questions an actor can answer about the page.

use async_trait::async_trait;
use std::fmt;

use super::actor::Actor;
use super::target::{TargetElement, TargetElements};
use super::{ScreenplayError, ScreenplayResult};

/// Information an actor can retrieve.
///
/// `Display` gives the description used in failure messages.
#[async_trait]
pub trait Question<T>: fmt::Display + Send + Sync {
    async fn answered_by(&self, actor: &Actor) -> ScreenplayResult<T>;
}

/// Text content of page elements
pub struct Text;

impl Text {
    pub fn of(target: &TargetElement) -> TextOf {
        TextOf {
            target: target.clone(),
        }
    }

    pub fn of_all(target: &TargetElements) -> TextOfAll {
        TextOfAll {
            target: target.clone(),
        }
    }
}

/// Text of a single element
#[derive(Debug, Clone)]
pub struct TextOf {
    target: TargetElement,
}

impl TextOf {
    /// Asks the same question within `parent`
    pub fn of(self, parent: &TargetElement) -> Self {
        Self {
            target: self.target.of(parent),
        }
    }
}

impl fmt::Display for TextOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the text of {}", self.target)
    }
}

#[async_trait]
impl Question<String> for TextOf {
    async fn answered_by(&self, actor: &Actor) -> ScreenplayResult<String> {
        actor
            .browser()?
            .text_of(self.target.locator())
            .await
            .map_err(|source| ScreenplayError::Browser {
                subject: format!("could not determine {}", self),
                source,
            })
    }
}

/// Text of every element in a collection, in document order
#[derive(Debug, Clone)]
pub struct TextOfAll {
    target: TargetElements,
}

impl TextOfAll {
    /// Asks the same question within `parent`
    pub fn of(self, parent: &TargetElement) -> Self {
        Self {
            target: self.target.of(parent),
        }
    }
}

impl fmt::Display for TextOfAll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the text of {}", self.target)
    }
}

#[async_trait]
impl Question<Vec<String>> for TextOfAll {
    async fn answered_by(&self, actor: &Actor) -> ScreenplayResult<Vec<String>> {
        actor
            .browser()?
            .texts_of_all(self.target.locator())
            .await
            .map_err(|source| ScreenplayError::Browser {
                subject: format!("could not determine {}", self),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screenplay::{By, Target};

    #[test]
    fn test_descriptions() {
        let header = Target::the("header").located(By::tag_name("h1"));
        assert_eq!(Text::of(&header).to_string(), "the text of the header");

        let items = Target::all("shopping list items").located(By::css("li"));
        assert_eq!(
            Text::of_all(&items).to_string(),
            "the text of the shopping list items"
        );

        let body = Target::the("body").located(By::tag_name("body"));
        assert_eq!(
            Text::of_all(&items).of(&body).to_string(),
            "the text of the shopping list items of the body"
        );
    }

    #[tokio::test]
    async fn test_answering_requires_a_browser() {
        let header = Target::the("header").located(By::tag_name("h1"));
        let err = Text::of(&header)
            .answered_by(&Actor::named("Bernie"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScreenplayError::MissingAbility { .. }));
    }
}
