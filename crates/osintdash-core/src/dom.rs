//! Arena-backed element tree the dispatcher and its handlers operate on.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

use scraper::Html;

use crate::selector::Selector;

/// Class that hides an element (and its subtree) when present.
pub const HIDDEN_CLASS: &str = "d-none";

/// Attribute carrying the arena index in the markup handed to the selector
/// engine.
const NODE_ATTR: &str = "data-osintdash-node";

/// Elements that never have children in markup.
const VOID_TAGS: [&str; 6] = ["input", "br", "hr", "img", "meta", "link"];

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single element: tag, id, classes, attributes and its own text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    /// Text directly owned by this element (children contribute their own).
    pub text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// An element tree rooted at a `body` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root is always present.
        false
    }

    /// Append `element` as the last child of `parent`.
    ///
    /// Returns `None` if `parent` does not belong to this document.
    pub fn append(&mut self, parent: NodeId, mut element: Element) -> Option<NodeId> {
        if parent.0 >= self.nodes.len() {
            return None;
        }
        let id = NodeId(self.nodes.len());
        element.parent = Some(parent);
        element.children.clear();
        self.nodes.push(element);
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0)
    }

    /// Nearest element, starting at `start` itself, that carries `attr`.
    pub fn closest_with_attr(&self, start: NodeId, attr: &str) -> Option<NodeId> {
        let mut current = Some(start);
        while let Some(id) = current {
            let element = self.get(id)?;
            if element.attributes.contains_key(attr) {
                return Some(id);
            }
            current = element.parent;
        }
        None
    }

    /// Concatenated text of `id` and all of its descendants, in tree order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(element) = self.get(id) {
            out.push_str(&element.text);
            for &child in &element.children {
                self.collect_text(child, out);
            }
        }
    }

    /// First element in document order matching `selector`.
    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// All elements in document order matching `selector`.
    ///
    /// The tree is rendered to markup tagged with arena indices, matched
    /// there, and the hits are mapped back to nodes.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        let html = Html::parse_document(&self.to_markup());
        let hits: HashSet<usize> = html
            .select(selector.compiled())
            .filter_map(|e| e.value().attr(NODE_ATTR)?.parse().ok())
            .collect();
        self.preorder().filter(|id| hits.contains(&id.0)).collect()
    }

    /// All descendants of `id` (not `id` itself) in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(id) {
            Some(element) => element.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(element) = self.get(node) {
                stack.extend(element.children.iter().rev().copied());
            }
        }
        out
    }

    fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(self.root(), &mut out);
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let Some(element) = self.get(id) else {
            return;
        };
        let _ = write!(out, "<{} {}=\"{}\"", element.tag, NODE_ATTR, id.0);
        if let Some(el_id) = &element.id {
            let _ = write!(out, " id=\"{}\"", escape_attr(el_id));
        }
        if !element.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_attr(&element.classes.join(" ")));
        }
        for (name, value) in &element.attributes {
            if matches!(name.as_str(), "id" | "class" | NODE_ATTR) {
                continue;
            }
            let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
        }
        out.push('>');
        if VOID_TAGS.contains(&element.tag.as_str()) {
            return;
        }
        for &child in &element.children {
            self.write_markup(child, out);
        }
        let _ = write!(out, "</{}>", element.tag);
    }

    fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root()];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            if let Some(element) = self.get(id) {
                stack.extend(element.children.iter().rev().copied());
            }
            Some(id)
        })
    }

    /// Toggle `class` on `id`. Returns whether the class is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(element) = self.get_mut(id) else {
            return false;
        };
        if let Some(pos) = element.classes.iter().position(|c| c == class) {
            element.classes.remove(pos);
            false
        } else {
            element.classes.push(class.to_string());
            true
        }
    }

    /// Set an attribute. Returns false if `id` is not in the document.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(element) => {
                element.attributes.insert(name.to_string(), value.into());
                true
            }
            None => false,
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.get_mut(id)?.attributes.remove(name)
    }

    /// Add or remove `class` on `id`.
    pub fn set_class(&mut self, id: NodeId, class: &str, present: bool) {
        let Some(element) = self.get_mut(id) else {
            return;
        };
        let pos = element.classes.iter().position(|c| c == class);
        match (pos, present) {
            (None, true) => element.classes.push(class.to_string()),
            (Some(pos), false) => {
                element.classes.remove(pos);
            }
            _ => {}
        }
    }

    /// An element is visible when neither it nor any ancestor is hidden.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            match self.get(node) {
                Some(element) if element.has_class(HIDDEN_CLASS) => return false,
                Some(element) => current = element.parent,
                None => return false,
            }
        }
        true
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let button = doc
            .append(
                root,
                Element::new("button")
                    .with_class("btn")
                    .with_attr("data-action", "copy-text"),
            )
            .unwrap();
        let label = doc
            .append(button, Element::new("span").with_text("example.com"))
            .unwrap();
        let section = doc
            .append(root, Element::new("section").with_id("details"))
            .unwrap();
        (doc, button, label, section)
    }

    #[test]
    fn closest_walks_up_inclusive() {
        let (doc, button, label, section) = sample();
        assert_eq!(doc.closest_with_attr(label, "data-action"), Some(button));
        assert_eq!(doc.closest_with_attr(button, "data-action"), Some(button));
        assert_eq!(doc.closest_with_attr(section, "data-action"), None);
    }

    #[test]
    fn text_content_includes_descendants() {
        let (mut doc, button, _, _) = sample();
        doc.get_mut(button).unwrap().text = "Copy ".into();
        assert_eq!(doc.text_content(button), "Copy example.com");
    }

    #[test]
    fn query_selector_in_document_order() {
        let (mut doc, _, _, section) = sample();
        let root = doc.root();
        let second = doc
            .append(root, Element::new("section").with_id("summary"))
            .unwrap();
        let sel = Selector::parse("section").unwrap();
        assert_eq!(doc.query_selector(&sel), Some(section));
        assert_eq!(doc.query_selector_all(&sel), vec![section, second]);
        assert_eq!(doc.query_selector(&Selector::parse("#missing").unwrap()), None);
    }

    #[test]
    fn attribute_values_with_markup_characters_still_match() {
        let (mut doc, button, _, _) = sample();
        doc.set_attr(button, "data-params", r#"{"text":"<a href=\"x\">&</a>"}"#);
        let sel = Selector::parse("button[data-params*='&']").unwrap();
        assert_eq!(doc.query_selector(&sel), Some(button));
        assert_eq!(
            doc.get(button).unwrap().attr("data-params"),
            Some(r#"{"text":"<a href=\"x\">&</a>"}"#)
        );
    }

    #[test]
    fn descendants_are_in_document_order() {
        let (mut doc, button, label, section) = sample();
        let nested = doc.append(label, Element::new("em")).unwrap();
        let root = doc.root();
        assert_eq!(doc.descendants(root), vec![button, label, nested, section]);
        assert!(doc.descendants(section).is_empty());
    }

    #[test]
    fn set_class_and_attributes() {
        let (mut doc, _, _, section) = sample();
        doc.set_class(section, "is-invalid", true);
        doc.set_class(section, "is-invalid", true);
        assert_eq!(doc.get(section).unwrap().classes, vec!["is-invalid".to_string()]);
        doc.set_class(section, "is-invalid", false);
        assert!(doc.get(section).unwrap().classes.is_empty());

        assert!(doc.set_attr(section, "data-error", "bad"));
        assert_eq!(doc.remove_attr(section, "data-error").as_deref(), Some("bad"));
        assert_eq!(doc.remove_attr(section, "data-error"), None);
    }

    #[test]
    fn toggle_class_flips_visibility() {
        let (mut doc, button, label, _) = sample();
        assert!(doc.is_visible(label));
        assert!(doc.toggle_class(button, HIDDEN_CLASS));
        assert!(!doc.is_visible(label));
        assert!(!doc.toggle_class(button, HIDDEN_CLASS));
        assert!(doc.is_visible(label));
    }

    #[test]
    fn append_to_foreign_node_is_rejected() {
        let mut doc = Document::new();
        assert!(doc.append(NodeId(42), Element::new("div")).is_none());
        assert_eq!(doc.len(), 1);
    }
}
