//! Locators and the named targets that wrap them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy for finding elements on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "using", content = "value", rename_all = "snake_case")]
pub enum By {
    Css(String),
    TagName(String),
    Id(String),
    XPath(String),
}

impl By {
    pub fn css(selector: impl Into<String>) -> Self {
        By::Css(selector.into())
    }

    pub fn tag_name(name: impl Into<String>) -> Self {
        By::TagName(name.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        By::Id(id.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        By::XPath(expression.into())
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::Css(selector) => write!(f, "css '{}'", selector),
            By::TagName(name) => write!(f, "tag name '{}'", name),
            By::Id(id) => write!(f, "id '{}'", id),
            By::XPath(expression) => write!(f, "xpath '{}'", expression),
        }
    }
}

/// Chain of strategies, outermost scope first.
///
/// Each strategy is applied within the elements matched by the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    scopes: Vec<By>,
}

impl Locator {
    pub fn new(by: By) -> Self {
        Self { scopes: vec![by] }
    }

    /// This locator applied within the elements matched by `parent`
    pub fn within(&self, parent: &Locator) -> Self {
        Self {
            scopes: parent
                .scopes
                .iter()
                .chain(self.scopes.iter())
                .cloned()
                .collect(),
        }
    }

    pub fn scopes(&self) -> &[By] {
        &self.scopes
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, by) in self.scopes.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            write!(f, "{}", by)?;
        }
        Ok(())
    }
}

/// Entry point for describing page elements
///
/// ```
/// use screenplay_reporter::screenplay::{By, Target};
///
/// let header = Target::the("header").located(By::tag_name("h1"));
/// assert_eq!(header.to_string(), "the header");
/// ```
pub struct Target;

impl Target {
    /// A single element
    pub fn the(name: impl Into<String>) -> TargetBuilder {
        TargetBuilder { name: name.into() }
    }

    /// Every element matching a locator
    pub fn all(name: impl Into<String>) -> TargetsBuilder {
        TargetsBuilder { name: name.into() }
    }
}

pub struct TargetBuilder {
    name: String,
}

impl TargetBuilder {
    pub fn located(self, by: By) -> TargetElement {
        TargetElement {
            name: self.name,
            locator: Locator::new(by),
            scope: None,
        }
    }
}

pub struct TargetsBuilder {
    name: String,
}

impl TargetsBuilder {
    pub fn located(self, by: By) -> TargetElements {
        TargetElements {
            name: self.name,
            locator: Locator::new(by),
            scope: None,
        }
    }
}

/// A named single element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetElement {
    name: String,
    locator: Locator,
    scope: Option<String>,
}

impl TargetElement {
    /// The same element, looked up within `parent`
    pub fn of(&self, parent: &TargetElement) -> TargetElement {
        TargetElement {
            name: self.name.clone(),
            locator: self.locator.within(&parent.locator),
            scope: Some(parent.to_string()),
        }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }
}

impl fmt::Display for TargetElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe(f, &self.name, self.scope.as_deref())
    }
}

/// A named collection of elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetElements {
    name: String,
    locator: Locator,
    scope: Option<String>,
}

impl TargetElements {
    /// The same elements, looked up within `parent`
    pub fn of(&self, parent: &TargetElement) -> TargetElements {
        TargetElements {
            name: self.name.clone(),
            locator: self.locator.within(&parent.locator),
            scope: Some(parent.to_string()),
        }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }
}

impl fmt::Display for TargetElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe(f, &self.name, self.scope.as_deref())
    }
}

fn describe(f: &mut fmt::Formatter<'_>, name: &str, scope: Option<&str>) -> fmt::Result {
    write!(f, "the {}", name)?;
    if let Some(scope) = scope {
        write!(f, " of {}", scope)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_targets_chain_locators_and_descriptions() {
        let body = Target::the("body").located(By::tag_name("body"));
        let list = Target::the("list").located(By::css("ul"));
        let items = Target::all("shopping list items").located(By::css("li"));

        let scoped = items.of(&list.of(&body));
        assert_eq!(
            scoped.to_string(),
            "the shopping list items of the list of the body"
        );
        assert_eq!(
            scoped.locator().scopes(),
            &[By::tag_name("body"), By::css("ul"), By::css("li")]
        );
        assert_eq!(
            scoped.locator().to_string(),
            "tag name 'body' >> css 'ul' >> css 'li'"
        );
    }

    #[test]
    fn test_of_leaves_original_untouched() {
        let body = Target::the("body").located(By::tag_name("body"));
        let header = Target::the("header").located(By::tag_name("h1"));
        let _ = header.of(&body);
        assert_eq!(header.to_string(), "the header");
        assert_eq!(header.locator().scopes(), &[By::tag_name("h1")]);
    }
}
