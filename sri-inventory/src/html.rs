use std::fmt;

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::{ParseOpts, parse_document, parse_fragment};
use markup5ever::{Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use tendril::{StrTendril, TendrilSink};

use crate::error::HtmlError;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

// ————————————————————————————————————————————————————————————————————————————
// DATA MODEL
// ————————————————————————————————————————————————————————————————————————————

/// A parsed HTML document. Elements returned by [`Document::select`] share the
/// underlying tree, so attribute changes made through them show up when the
/// document is serialized.
pub struct Document {
    dom: RcDom,
    root: Element,
}

/// Handle to one element node of a [`Document`] or fragment.
#[derive(Clone)]
pub struct Element {
    handle: Handle,
}

impl Document {
    /// Parses a full HTML document.
    ///
    /// The HTML parser recovers from any input, so the only failure is a tree
    /// without an `<html>` root element.
    pub fn parse(source: &str) -> Result<Document, HtmlError> {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(source);
        let root = dom.document
            .children
            .borrow()
            .iter()
            .find(|node| is_element_named(node, "html"))
            .cloned()
            .map(|handle| Element { handle })
            .ok_or(HtmlError::NoDocumentElement)?;
        Ok(Document { dom, root })
    }
    /// The `<html>` element.
    pub fn document_element(&self) -> &Element {
        &self.root
    }
    /// All elements matching `selector`, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<Element> {
        self.root.select_inclusive(selector)
    }
    /// Serializes the document, doctype included.
    pub fn to_html_string(&self) -> std::io::Result<String> {
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        serialize_handle(&self.dom.document, opts)
    }
}

/// Parses an HTML fragment (as if it were the contents of `<body>`) and
/// returns its top-level elements. Text between elements is dropped.
///
/// The returned elements own their subtrees and no longer have a parent.
pub fn parse_fragment_elements(source: &str) -> Vec<Element> {
    let context = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from("body"));
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
        .one(source.trim());
    // The fragment parser wraps the parsed nodes in a synthetic <html> element.
    let wrapper = dom.document.children.borrow().first().cloned();
    let Some(wrapper) = wrapper else {
        return Vec::new()
    };
    // Dropping the dom empties every node still attached to it, so the
    // top-level nodes are detached first.
    let children = wrapper.children.borrow_mut().drain(..).collect::<Vec<_>>();
    children
        .into_iter()
        .filter(|node| matches!(node.data, NodeData::Element { .. }))
        .map(|handle| {
            handle.parent.set(None);
            Element { handle }
        })
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// ELEMENT API
// ————————————————————————————————————————————————————————————————————————————

impl Element {
    /// Lowercase tag name.
    pub fn tag(&self) -> String {
        match &self.handle.data {
            NodeData::Element { name, .. } => str::to_ascii_lowercase(&name.local),
            _ => String::new(),
        }
    }
    pub fn has_tag(&self, tag: impl AsRef<str>) -> bool {
        self.tag() == tag.as_ref().to_ascii_lowercase()
    }
    pub fn attr(&self, name: &str) -> Option<String> {
        let NodeData::Element { attrs, .. } = &self.handle.data else {
            return None
        };
        attrs
            .borrow()
            .iter()
            .find(|attr| attr_is_named(attr, name))
            .map(|attr| attr.value.to_string())
    }
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
    /// Replaces the value of `name`, or appends the attribute when missing.
    pub fn set_attr(&self, name: &str, value: &str) {
        let NodeData::Element { attrs, .. } = &self.handle.data else {
            return
        };
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|attr| attr_is_named(attr, name)) {
            Some(attr) => attr.value = StrTendril::from_slice(value),
            None => attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name.to_ascii_lowercase())),
                value: StrTendril::from_slice(value),
            }),
        }
    }
    pub fn remove_attr(&self, name: &str) {
        if let NodeData::Element { attrs, .. } = &self.handle.data {
            attrs.borrow_mut().retain(|attr| !attr_is_named(attr, name));
        }
    }
    /// Descendants matching `selector`, in document order. The element itself
    /// is not considered.
    pub fn select(&self, selector: &Selector) -> Vec<Element> {
        let mut output = Vec::new();
        for child in self.handle.children.borrow().iter() {
            collect_matches(child, selector, &mut output);
        }
        output
    }
    /// Serializes the element itself and its subtree.
    pub fn outer_html(&self) -> std::io::Result<String> {
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        };
        serialize_handle(&self.handle, opts)
    }
    fn select_inclusive(&self, selector: &Selector) -> Vec<Element> {
        let mut output = Vec::new();
        collect_matches(&self.handle, selector, &mut output);
        output
    }
    fn attr_pairs(&self) -> Vec<(String, String)> {
        match &self.handle.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag())
            .field("attrs", &self.attr_pairs())
            .finish()
    }
}

fn collect_matches(handle: &Handle, selector: &Selector, output: &mut Vec<Element>) {
    if matches!(handle.data, NodeData::Element { .. }) {
        let element = Element { handle: handle.clone() };
        if selector.matches(&element) {
            output.push(element);
        }
    }
    for child in handle.children.borrow().iter() {
        collect_matches(child, selector, output);
    }
}

fn is_element_named(handle: &Handle, tag: &str) -> bool {
    match &handle.data {
        NodeData::Element { name, .. } => str::eq_ignore_ascii_case(&name.local, tag),
        _ => false,
    }
}

fn attr_is_named(attr: &Attribute, name: &str) -> bool {
    str::eq_ignore_ascii_case(&attr.name.local, name)
}

fn serialize_handle(handle: &Handle, opts: SerializeOpts) -> std::io::Result<String> {
    let mut bytes = Vec::new();
    serialize(&mut bytes, &SerializableHandle::from(handle.clone()), opts)?;
    String::from_utf8(bytes).map_err(|error| std::io::Error::new(std::io::ErrorKind::InvalidData, error))
}

// ————————————————————————————————————————————————————————————————————————————
// SELECTORS
// ————————————————————————————————————————————————————————————————————————————

/// The subset of CSS selectors needed to locate asset references:
/// comma-separated compounds of an optional type selector (`script`, `*`)
/// followed by attribute selectors (`[src]`, `[rel=stylesheet]`).
/// Combinators, classes, ids, and pseudo-classes are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    groups: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    attrs: Vec<AttrMatcher>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatcher {
    name: String,
    value: Option<String>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Selector, HtmlError> {
        let invalid = |reason: &str| HtmlError::InvalidSelector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };
        let groups = source
            .split(',')
            .map(|group| Compound::parse(group.trim()).map_err(|reason| invalid(reason)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selector { groups })
    }
    pub fn matches(&self, element: &Element) -> bool {
        self.groups.iter().any(|group| group.matches(element))
    }
}

impl Compound {
    fn parse(source: &str) -> Result<Compound, &'static str> {
        if source.is_empty() {
            return Err("empty selector group")
        }
        let tag_end = source.find('[').unwrap_or(source.len());
        let tag = &source[..tag_end];
        let tag = match tag {
            "" | "*" => None,
            name if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') => {
                Some(name.to_ascii_lowercase())
            }
            _ => return Err("only type and attribute selectors are supported"),
        };
        let mut attrs = Vec::new();
        let mut rest = &source[tag_end..];
        while !rest.is_empty() {
            let Some(inner) = rest.strip_prefix('[') else {
                return Err("only type and attribute selectors are supported")
            };
            let Some(close) = inner.find(']') else {
                return Err("unterminated attribute selector")
            };
            attrs.push(AttrMatcher::parse(&inner[..close])?);
            rest = &inner[close + 1..];
        }
        Ok(Compound { tag, attrs })
    }
    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.has_tag(tag) {
                return false
            }
        }
        self.attrs.iter().all(|matcher| match (&matcher.value, element.attr(&matcher.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == &actual,
        })
    }
}

impl AttrMatcher {
    fn parse(source: &str) -> Result<AttrMatcher, &'static str> {
        let (name, value) = match source.split_once('=') {
            Some((name, value)) => {
                let value = value.trim();
                let value = value
                    .strip_prefix('"').and_then(|v| v.strip_suffix('"'))
                    .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                    .unwrap_or(value);
                (name.trim(), Some(value.to_string()))
            }
            None => (source.trim(), None),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':') {
            return Err("invalid attribute name")
        }
        Ok(AttrMatcher { name: name.to_ascii_lowercase(), value })
    }
}
