//! CSS selectors for section toggles and form lookups.
//!
//! Parsing and matching are done by `scraper`, so anything a browser's
//! `querySelector` accepts works here too: compound selectors, combinators,
//! selector groups and pseudo-classes such as `:not()`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("invalid selector {input:?}: {reason}")]
    Invalid { input: String, reason: String },
}

/// A parsed selector, kept together with its source text.
#[derive(Clone)]
pub struct Selector {
    source: String,
    compiled: scraper::Selector,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }
        let compiled = scraper::Selector::parse(source).map_err(|e| SelectorError::Invalid {
            input: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            compiled,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn compiled(&self) -> &scraper::Selector {
        &self.compiled
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.source).finish()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Selector {}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, Element, NodeId};

    fn page() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let section = doc
            .append(root, Element::new("section").with_id("whois").with_class("section"))
            .unwrap();
        let form = doc
            .append(
                root,
                Element::new("form")
                    .with_id("new-investigation")
                    .with_class("ajax-form")
                    .with_attr("name", "create"),
            )
            .unwrap();
        doc.append(form, Element::new("input").with_attr("name", "target"))
            .unwrap();
        (doc, section, form)
    }

    fn first(doc: &Document, selector: &str) -> Option<NodeId> {
        doc.query_selector(&Selector::parse(selector).unwrap())
    }

    #[test]
    fn compound_selector_matches_form() {
        let (doc, _, form) = page();
        assert_eq!(
            first(&doc, "form#new-investigation.ajax-form[name=\"create\"]"),
            Some(form)
        );
        assert_eq!(first(&doc, "#new-investigation"), Some(form));
        assert_eq!(first(&doc, "#other"), None);
    }

    #[test]
    fn tag_match_is_case_insensitive() {
        let (doc, _, form) = page();
        assert_eq!(first(&doc, "FORM"), Some(form));
    }

    #[test]
    fn attribute_presence_and_value() {
        let (doc, _, form) = page();
        assert_eq!(first(&doc, "form[name]"), Some(form));
        assert_eq!(first(&doc, "[name=create]"), Some(form));
        assert_eq!(first(&doc, "[name='delete']"), None);
        assert_eq!(first(&doc, "form[action]"), None);
    }

    #[test]
    fn combinators_and_groups() {
        let (doc, section, form) = page();
        let input = first(&doc, "form > input[name=target]").unwrap();
        assert_eq!(doc.get(input).unwrap().parent(), Some(form));
        assert_eq!(first(&doc, "section input"), None);
        let all = doc.query_selector_all(&Selector::parse("#whois, .ajax-form").unwrap());
        assert_eq!(all, vec![section, form]);
        assert_eq!(first(&doc, "section:not(.section)"), None);
    }

    #[test]
    fn rejects_empty_and_malformed() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("#"),
            Err(SelectorError::Invalid { .. })
        ));
        assert!(matches!(
            Selector::parse("div >"),
            Err(SelectorError::Invalid { .. })
        ));
    }

    #[test]
    fn keeps_source_text() {
        let sel: Selector = "  #whois ".parse().unwrap();
        assert_eq!(sel.as_str(), "#whois");
        assert_eq!(sel.to_string(), "#whois");
    }
}
