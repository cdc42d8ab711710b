use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::LangError;

// ── Scope ─────────────────────────────────────────────────────────────────

/// Where a reference path starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Scope {
    /// `~@`: from the document root.
    Absolute,
    /// `.~@`: from the set the reference is declared in.
    Relative,
}

// ── Reference ─────────────────────────────────────────────────────────────

/// A reference that has been declared but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reference {
    /// Path segments, as written between the dots.
    pub path: Vec<String>,
    pub scope: Scope,
    /// Text appended to the resolved value.
    pub suffix: String,
    /// 1-based line of the declaration.
    pub line: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub source: Arc<str>,
}

impl Reference {
    pub(crate) fn new(path: &str, scope: Scope, line: usize, source: Arc<str>) -> Self {
        Self {
            path: path.split('.').map(str::to_owned).collect(),
            scope,
            suffix: String::new(),
            line,
            source,
        }
    }

    /// The path joined back with dots, as it was written.
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    pub(crate) fn error(&self, msg: impl Into<String>) -> LangError {
        LangError::new(self.line, msg, &*self.source)
    }
}

// ── RawTree ───────────────────────────────────────────────────────────────

/// A value in the tree produced by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawNode {
    Text(String),
    Set(RawTree),
    Reference(Reference),
}

/// A set before references are resolved. Entries keep declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RawTree {
    entries: IndexMap<String, RawNode>,
}

impl RawTree {
    pub fn get(&self, name: &str) -> Option<&RawNode> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawNode)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any set in the tree still holds an unresolved reference.
    pub fn has_references(&self) -> bool {
        self.entries.values().any(|node| match node {
            RawNode::Reference(_) => true,
            RawNode::Set(child) => child.has_references(),
            RawNode::Text(_) => false,
        })
    }

    /// Replace `name` with a new empty set and return its index.
    pub(crate) fn open_set(&mut self, name: &str) -> usize {
        self.entries.insert_full(name.to_owned(), RawNode::Set(RawTree::default())).0
    }

    /// Store a finished set in the slot [`open_set`](Self::open_set) made for it.
    pub(crate) fn close_set(&mut self, index: usize, name: String, set: RawTree) {
        match self.entries.get_index_mut(index) {
            Some((_, slot)) => *slot = RawNode::Set(set),
            None => {
                self.entries.insert(name, RawNode::Set(set));
            }
        }
    }

    /// `@name:value`: extends a reference, replaces anything else.
    pub(crate) fn assign_text(&mut self, name: &str, value: &str) {
        match self.entries.get_mut(name) {
            Some(RawNode::Reference(r)) => r.suffix.push_str(value),
            _ => {
                self.entries.insert(name.to_owned(), RawNode::Text(value.to_owned()));
            }
        }
    }

    /// Continuation text: extends a string or reference, replaces a set.
    pub(crate) fn append_text(&mut self, name: &str, text: &str) {
        match self.entries.get_mut(name) {
            Some(RawNode::Text(s)) => s.push_str(text),
            Some(RawNode::Reference(r)) => r.suffix.push_str(text),
            _ => {
                self.entries.insert(name.to_owned(), RawNode::Text(text.to_owned()));
            }
        }
    }

    /// `~@name:path`: extends a reference already at `name` with the text
    /// after the colon, replaces anything else.
    pub(crate) fn declare_reference(&mut self, name: &str, path: &str, declare: impl FnOnce() -> Reference) {
        match self.entries.get_mut(name) {
            Some(RawNode::Reference(r)) => r.suffix.push_str(path),
            _ => {
                self.entries.insert(name.to_owned(), RawNode::Reference(declare()));
            }
        }
    }
}

impl<'t> IntoIterator for &'t RawTree {
    type Item = (&'t String, &'t RawNode);
    type IntoIter = indexmap::map::Iter<'t, String, RawNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ── Tree ──────────────────────────────────────────────────────────────────

/// A resolved value: an attribute string or a nested set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Node {
    Text(String),
    Set(Tree),
}

impl Node {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            Node::Set(_) => None,
        }
    }

    pub fn as_set(&self) -> Option<&Tree> {
        match self {
            Node::Set(t) => Some(t),
            Node::Text(_) => None,
        }
    }
}

/// A fully resolved Lang document.
///
/// ```rust
/// let tree = pgt_lang::loads("$menu\n@title:Start\n").unwrap();
/// assert_eq!(tree.text("menu.title"), Some("Start"));
/// assert_eq!(tree.text_or_key("menu.quit"), "menu.quit");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tree {
    entries: IndexMap<String, Node>,
}

impl Tree {
    /// Look up a dotted path such as `"glyphs.a.width"`.
    pub fn get(&self, path: &str) -> Option<&Node> {
        let mut segments = path.split('.');
        let mut node = self.entries.get(segments.next()?)?;
        for segment in segments {
            node = node.as_set()?.entries.get(segment)?;
        }
        Some(node)
    }

    /// The string at `path`, if the path names an attribute.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path)?.as_text()
    }

    /// The set at `path`, if the path names a set.
    pub fn set(&self, path: &str) -> Option<&Tree> {
        self.get(path)?.as_set()
    }

    /// The string at `path`, or `path` itself when there is none.
    ///
    /// Translation tables use this so a missing entry shows its key.
    pub fn text_or_key<'a>(&'a self, path: &'a str) -> &'a str {
        self.text(path).unwrap_or(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn insert(&mut self, name: String, node: Node) {
        self.entries.insert(name, node);
    }

    pub(crate) fn take(&mut self, name: &str) -> Option<Node> {
        self.entries.shift_remove(name)
    }
}

impl<'t> IntoIterator for &'t Tree {
    type Item = (&'t String, &'t Node);
    type IntoIter = indexmap::map::Iter<'t, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
