//! In-memory pages standing in for a real browser driver

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use screenplay_reporter::screenplay::{BrowseTheWeb, BrowserError, By, Locator};

/// An element of a static page
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: String,
    pub children: Vec<Node>,
}

pub fn el(tag: &str) -> Node {
    Node {
        tag: tag.to_string(),
        ..Node::default()
    }
}

impl Node {
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Own text followed by the text of all descendants
    pub fn text_content(&self) -> String {
        let mut content = self.text.clone();
        for child in &self.children {
            content.push_str(&child.text_content());
        }
        content
    }

    fn matches(&self, by: &By) -> Result<bool, BrowserError> {
        match by {
            By::TagName(tag) => Ok(&self.tag == tag),
            By::Id(id) => Ok(self.id.as_deref() == Some(id.as_str())),
            By::Css(selector) => Ok(self.matches_css(selector)),
            By::XPath(_) => Err(BrowserError::Driver("xpath is not supported".to_string())),
        }
    }

    /// Supports `tag`, `.class`, `#id` and `tag.class`
    fn matches_css(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            return self.id.as_deref() == Some(id);
        }
        match selector.split_once('.') {
            Some(("", class)) => self.classes.iter().any(|c| c == class),
            Some((tag, class)) => self.tag == tag && self.classes.iter().any(|c| c == class),
            None => self.tag == selector,
        }
    }

    fn descendants_matching<'a>(
        &'a self,
        by: &By,
        found: &mut Vec<&'a Node>,
    ) -> Result<(), BrowserError> {
        for child in &self.children {
            if child.matches(by)? {
                found.push(child);
            }
            child.descendants_matching(by, found)?;
        }
        Ok(())
    }
}

/// A browser serving a fixed set of pages
#[derive(Default)]
pub struct StaticBrowser {
    pages: HashMap<String, Node>,
    current: Mutex<Option<Node>>,
}

impl StaticBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serving(mut self, url: &str, document: Node) -> Self {
        self.pages.insert(url.to_string(), document);
        self
    }

    fn find_all(&self, locator: &Locator) -> Result<Vec<String>, BrowserError> {
        let current = self.current.lock().unwrap();
        let document = current
            .as_ref()
            .ok_or_else(|| BrowserError::Driver("no page has been opened".to_string()))?;

        let mut scope = vec![document];
        for by in locator.scopes() {
            let mut found = Vec::new();
            for node in scope {
                node.descendants_matching(by, &mut found)?;
            }
            scope = found;
        }

        Ok(scope
            .into_iter()
            .map(|node| node.text_content().trim().to_string())
            .collect())
    }
}

#[async_trait]
impl BrowseTheWeb for StaticBrowser {
    async fn navigate_to(&self, url: &str) -> Result<(), BrowserError> {
        let page = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::Navigation {
                url: url.to_string(),
                reason: "404 Not Found".to_string(),
            })?;
        *self.current.lock().unwrap() = Some(page);
        Ok(())
    }

    async fn text_of(&self, locator: &Locator) -> Result<String, BrowserError> {
        self.find_all(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::NoSuchElement(locator.to_string()))
    }

    async fn texts_of_all(&self, locator: &Locator) -> Result<Vec<String>, BrowserError> {
        self.find_all(locator)
    }
}
