// SPDX-License-Identifier: MIT

//! In-memory host document
//!
//! A small element tree with per-element computed style, loadable from YAML
//! or JSON fixtures:
//!
//! ```yaml
//! stylesheets:
//!   - rules:
//!       - selector: ".box.where-width-gt-400px"
//!       - {}            # a rule without selector text, e.g. @media
//! elements:
//!   - tag: div
//!     id: first
//!     class: box
//!     attrs: { data-kind: card }
//!     style: { width: 500px }
//!     children: []
//! ```
//!
//! Selector queries go through `scraper`: the tree is rendered to markup,
//! parsed as an HTML fragment and matched with the full selector grammar
//! (attributes, structural pseudo-classes, combinators). Each rendered
//! element carries its node index in `data-memory-index`, a reserved
//! attribute name, so that matches map back to handles. The
//! fragment parser applies HTML nesting rules, so fixtures must nest the way
//! HTML allows (no block elements inside `<p>`, table parts inside a
//! `<table>`).

use super::{Document, Element, StyleSheet};
use crate::error::{HostError, WhereError};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Attribute carrying the node index in rendered markup
const INDEX_ATTR: &str = "data-memory-index";

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Dropped by the fragment parser
const DOCUMENT_TAGS: &[&str] = &["html", "head", "body"];

fn default_tag() -> String {
    "div".to_string()
}

/// Serialized form of an element and its subtree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementFixture {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class: String,
    /// Attributes other than `id` and `class`
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub style: HashMap<String, String>,
    #[serde(default)]
    pub children: Vec<ElementFixture>,
}

/// Serialized form of a whole document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFixture {
    #[serde(default)]
    pub stylesheets: Vec<StyleSheet>,
    #[serde(default)]
    pub elements: Vec<ElementFixture>,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    id: Option<String>,
    class: String,
    attrs: BTreeMap<String, String>,
    style: HashMap<String, String>,
    children: Vec<usize>,
}

#[derive(Debug, Default)]
struct Tree {
    /// Nodes in document (pre-)order
    nodes: Vec<Node>,
    roots: Vec<usize>,
    style_sheets: Vec<StyleSheet>,
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_valid_attr_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

impl Tree {
    fn push_subtree(&mut self, fixture: ElementFixture) -> Result<usize, HostError> {
        let tag = fixture.tag.to_ascii_lowercase();
        if !is_valid_tag(&tag) || DOCUMENT_TAGS.contains(&tag.as_str()) {
            return Err(HostError::InvalidFixture(format!(
                "unsupported tag '{}'",
                fixture.tag
            )));
        }
        if VOID_TAGS.contains(&tag.as_str()) && !fixture.children.is_empty() {
            return Err(HostError::InvalidFixture(format!(
                "<{}> cannot have children",
                tag
            )));
        }
        for name in fixture.attrs.keys() {
            let reserved = matches!(name.as_str(), "id" | "class" | INDEX_ATTR);
            if reserved || !is_valid_attr_name(name) {
                return Err(HostError::InvalidFixture(format!(
                    "attribute '{}' on <{}>",
                    name, tag
                )));
            }
        }

        let index = self.nodes.len();
        self.nodes.push(Node {
            tag,
            id: fixture.id,
            class: fixture.class,
            attrs: fixture.attrs,
            style: fixture.style,
            children: Vec::new(),
        });
        for child in fixture.children {
            let child_index = self.push_subtree(child)?;
            self.nodes[index].children.push(child_index);
        }
        Ok(index)
    }

    fn find(&self, id: &str) -> Result<usize, HostError> {
        self.nodes
            .iter()
            .position(|n| n.id.as_deref() == Some(id))
            .ok_or_else(|| HostError::ElementNotFound(id.to_string()))
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.render_node(root, &mut out);
        }
        out
    }

    fn render_node(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        out.push('<');
        out.push_str(&node.tag);
        push_attr(out, INDEX_ATTR, &index.to_string());
        if let Some(id) = &node.id {
            push_attr(out, "id", id);
        }
        if !node.class.is_empty() {
            push_attr(out, "class", &node.class);
        }
        for (name, value) in &node.attrs {
            push_attr(out, name, value);
        }
        out.push('>');

        if VOID_TAGS.contains(&node.tag.as_str()) {
            return;
        }
        for &child in &node.children {
            self.render_node(child, out);
        }
        out.push_str("</");
        out.push_str(&node.tag);
        out.push('>');
    }

    /// Indices of the nodes matching `selector`, in document order
    fn select(&self, selector: &Selector) -> Vec<usize> {
        let html = Html::parse_fragment(&self.render());
        let mut indices: Vec<usize> = html
            .select(selector)
            .filter_map(|el| el.value().attr(INDEX_ATTR))
            .filter_map(|raw| raw.parse().ok())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

/// Shared, thread-safe in-memory document.
///
/// Cloning yields another handle to the same tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    tree: Arc<RwLock<Tree>>,
}

/// Handle to one element of a [`MemoryDocument`]
#[derive(Debug, Clone)]
pub struct MemoryElement {
    tree: Arc<RwLock<Tree>>,
    index: usize,
}

fn read(tree: &RwLock<Tree>) -> RwLockReadGuard<'_, Tree> {
    tree.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(tree: &RwLock<Tree>) -> RwLockWriteGuard<'_, Tree> {
    tree.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryDocument {
    pub fn new(fixture: DocumentFixture) -> Result<Self, HostError> {
        let mut tree = Tree {
            style_sheets: fixture.stylesheets,
            ..Tree::default()
        };
        for element in fixture.elements {
            let root = tree.push_subtree(element)?;
            tree.roots.push(root);
        }
        Ok(Self {
            tree: Arc::new(RwLock::new(tree)),
        })
    }

    /// Load a document from a `.yaml`/`.yml` or `.json` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WhereError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, WhereError> {
        let fixture: DocumentFixture = serde_yaml::from_str(content)?;
        Ok(Self::new(fixture)?)
    }

    pub fn from_json(content: &str) -> Result<Self, WhereError> {
        let fixture: DocumentFixture = serde_json::from_str(content)?;
        Ok(Self::new(fixture)?)
    }

    pub fn add_style_sheet(&self, sheet: StyleSheet) {
        write(&self.tree).style_sheets.push(sheet);
    }

    pub fn element_by_id(&self, id: &str) -> Result<MemoryElement, HostError> {
        let index = read(&self.tree).find(id)?;
        Ok(MemoryElement {
            tree: Arc::clone(&self.tree),
            index,
        })
    }

    /// Change the computed style of element `id`
    pub fn set_style(&self, id: &str, property: &str, value: &str) -> Result<(), HostError> {
        let mut tree = write(&self.tree);
        let index = tree.find(id)?;
        tree.nodes[index]
            .style
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    pub fn class_of(&self, id: &str) -> Result<String, HostError> {
        let tree = read(&self.tree);
        let index = tree.find(id)?;
        Ok(tree.nodes[index].class.clone())
    }

    /// `(label, class string)` for every element in document order.
    ///
    /// The label is `tag#id` when the element has an id and `tag[n]`
    /// (document position) otherwise.
    pub fn class_snapshot(&self) -> Vec<(String, String)> {
        read(&self.tree)
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let label = match &n.id {
                    Some(id) => format!("{}#{}", n.tag, id),
                    None => format!("{}[{}]", n.tag, i),
                };
                (label, n.class.clone())
            })
            .collect()
    }
}

impl Document for MemoryDocument {
    type Element = MemoryElement;

    fn style_sheets(&self) -> Vec<StyleSheet> {
        read(&self.tree).style_sheets.clone()
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<MemoryElement>, HostError> {
        if selector.trim().is_empty() {
            return Ok(Vec::new());
        }
        let parsed = Selector::parse(selector)
            .map_err(|e| HostError::invalid_selector(selector, format!("{:?}", e)))?;

        let indices = read(&self.tree).select(&parsed);
        Ok(indices
            .into_iter()
            .map(|index| MemoryElement {
                tree: Arc::clone(&self.tree),
                index,
            })
            .collect())
    }
}

impl MemoryElement {
    pub fn id(&self) -> Option<String> {
        read(&self.tree).nodes[self.index].id.clone()
    }
}

impl Element for MemoryElement {
    fn computed_style(&self, property: &str) -> Option<String> {
        read(&self.tree).nodes[self.index].style.get(property).cloned()
    }

    fn class_name(&self) -> String {
        read(&self.tree).nodes[self.index].class.clone()
    }

    fn set_class_name(&self, value: &str) {
        write(&self.tree).nodes[self.index].class = value.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::CssRule;

    const FIXTURE: &str = r#"
stylesheets:
  - rules:
      - selector: ".box.where-width-gt-400px"
      - {}
elements:
  - tag: section
    id: outer
    class: panel
    children:
      - id: first
        class: box
        attrs: { data-kind: card }
        style:
          width: 500px
      - tag: p
        id: second
        class: box note
        children:
          - tag: span
            id: deep
            class: box
  - id: loose
    class: box
  - tag: ul
    id: list
    children:
      - tag: li
        id: one
      - tag: li
        id: two
"#;

    fn doc() -> MemoryDocument {
        MemoryDocument::from_yaml(FIXTURE).unwrap()
    }

    fn ids(elements: &[MemoryElement]) -> Vec<String> {
        elements.iter().filter_map(|e| e.id()).collect()
    }

    fn query(selector: &str) -> Vec<String> {
        ids(&doc().query_selector_all(selector).unwrap())
    }

    #[test]
    fn test_load_stylesheets_from_yaml() {
        let sheets = doc().style_sheets();
        assert_eq!(sheets.len(), 1);
        assert_eq!(
            sheets[0].rules,
            vec![CssRule::style(".box.where-width-gt-400px"), CssRule::at_rule()]
        );
    }

    #[test]
    fn test_query_by_class_in_document_order() {
        assert_eq!(query(".box"), vec!["first", "second", "deep", "loose"]);
    }

    #[test]
    fn test_query_union_returns_each_element_once() {
        assert_eq!(
            query(".box, .note, p"),
            vec!["first", "second", "deep", "loose"]
        );
    }

    #[test]
    fn test_query_descendant_and_child() {
        assert_eq!(query(".panel .box"), vec!["first", "second", "deep"]);
        assert_eq!(query(".panel > .box"), vec!["first", "second"]);
        assert_eq!(query("section p > span"), vec!["deep"]);
    }

    #[test]
    fn test_query_by_id_and_tag() {
        assert_eq!(query("#deep"), vec!["deep"]);
        assert_eq!(query("p.note"), vec!["second"]);
    }

    #[test]
    fn test_query_attribute_selectors() {
        assert_eq!(query("div[data-kind]"), vec!["first"]);
        assert_eq!(query("[data-kind=card].box"), vec!["first"]);
        assert!(query("[data-kind=table]").is_empty());
    }

    #[test]
    fn test_query_structural_pseudo_classes() {
        assert_eq!(query("li:first-child"), vec!["one"]);
        assert_eq!(query("ul > li:last-child"), vec!["two"]);
        assert_eq!(query("li:not(#one)"), vec!["two"]);
    }

    #[test]
    fn test_query_sees_class_changes() {
        let doc = doc();
        doc.element_by_id("two").unwrap().set_class_name("picked");
        assert_eq!(ids(&doc.query_selector_all("li.picked").unwrap()), vec!["two"]);
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        assert!(query("").is_empty());
        assert!(query("  ").is_empty());
    }

    #[test]
    fn test_invalid_query_is_an_error() {
        let doc = doc();
        for selector in [", .b", ".a >", ".a..b", "div["] {
            assert!(
                matches!(
                    doc.query_selector_all(selector),
                    Err(HostError::InvalidSelector { .. })
                ),
                "{}",
                selector
            );
        }
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let doc = MemoryDocument::from_yaml(
            r#"
elements:
  - id: q
    attrs: { title: "a \"quoted\" <b> & c" }
"#,
        )
        .unwrap();
        let found = doc
            .query_selector_all(r#"[title='a "quoted" <b> & c']"#)
            .unwrap();
        assert_eq!(ids(&found), vec!["q"]);
    }

    #[test]
    fn test_invalid_fixtures_are_rejected() {
        for yaml in [
            "elements:\n  - tag: \"not a tag\"\n",
            "elements:\n  - tag: body\n",
            "elements:\n  - tag: img\n    children:\n      - id: x\n",
            "elements:\n  - attrs: { class: nope }\n",
        ] {
            assert!(
                matches!(
                    MemoryDocument::from_yaml(yaml),
                    Err(WhereError::Host(HostError::InvalidFixture(_)))
                ),
                "{}",
                yaml
            );
        }
    }

    #[test]
    fn test_style_mutation_is_visible_through_handles() {
        let doc = doc();
        let el = doc.element_by_id("first").unwrap();
        assert_eq!(el.computed_style("width").as_deref(), Some("500px"));

        doc.set_style("first", "width", "300px").unwrap();
        assert_eq!(el.computed_style("width").as_deref(), Some("300px"));
        assert_eq!(el.computed_style("height"), None);
    }

    #[test]
    fn test_class_writes_are_shared() {
        let doc = doc();
        let el = doc.element_by_id("loose").unwrap();
        el.set_class_name("box on");
        assert_eq!(doc.class_of("loose").unwrap(), "box on");
    }

    #[test]
    fn test_unknown_id() {
        assert_eq!(
            doc().set_style("nope", "width", "1px"),
            Err(HostError::ElementNotFound("nope".to_string()))
        );
    }

    #[test]
    fn test_load_from_json() {
        let doc = MemoryDocument::from_json(
            r#"{"stylesheets":[{"rules":[{"selector_text":".a"}]}],"elements":[{"id":"x","class":"a"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.style_sheets()[0].rules[0], CssRule::style(".a"));
        assert_eq!(doc.class_snapshot(), vec![("div#x".to_string(), "a".to_string())]);
    }
}
