use std::sync::Arc;

use crate::encoding::same_encoding;
use crate::error::LangError;
use crate::line::{classify, is_valid_name, source_lines, Line};
use crate::tree::{RawTree, Reference};

// ── BuildError ────────────────────────────────────────────────────────────

/// Why a build stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    Lang(LangError),
    /// The text declares an encoding other than the one it was decoded with.
    /// The caller should decode the original bytes again and rebuild.
    Redecode { encoding: String, line: usize },
}

impl From<LangError> for BuildError {
    fn from(err: LangError) -> Self {
        BuildError::Lang(err)
    }
}

// ── Builder ───────────────────────────────────────────────────────────────

/// A set still taking entries. It is moved into its parent when it closes.
struct OpenSet {
    /// Slot reserved for it in the parent.
    index: usize,
    name: String,
    tree: RawTree,
}

/// Turns Lang source into a [`RawTree`], one line at a time.
pub struct Builder<'e> {
    encoding: &'e str,
    source: Arc<str>,
    root: RawTree,
    /// Open sets from the root down. The set opened with `n` markers sits
    /// at `scopes[n - 1]`.
    scopes: Vec<OpenSet>,
    /// Attribute waiting for continuation lines.
    pending: Option<String>,
}

impl<'e> Builder<'e> {
    pub fn new(encoding: &'e str, source: &str) -> Self {
        Self {
            encoding,
            source: source.into(),
            root: RawTree::default(),
            scopes: Vec::new(),
            pending: None,
        }
    }

    fn err(&self, line: usize, msg: impl Into<String>) -> LangError {
        LangError::new(line, msg, &*self.source)
    }

    fn check_name(&self, line: usize, name: &str) -> Result<(), LangError> {
        if is_valid_name(name) {
            Ok(())
        } else {
            Err(self.err(line, format!("name '{name}' is not valid")))
        }
    }

    /// The innermost open set.
    fn current(&mut self) -> &mut RawTree {
        match self.scopes.last_mut() {
            Some(open) => &mut open.tree,
            None => &mut self.root,
        }
    }

    /// Close sets until `level` of them are left open.
    fn close_to(&mut self, level: usize) {
        while self.scopes.len() > level {
            let Some(open) = self.scopes.pop() else { break };
            self.current().close_set(open.index, open.name, open.tree);
        }
    }

    /// Number of open levels, counting the root.
    fn height(&self) -> usize {
        self.scopes.len() + 1
    }

    pub fn build(mut self, src: &str) -> Result<RawTree, BuildError> {
        for (line_no, text) in source_lines(src) {
            let line = classify(text).map_err(|e| self.err(line_no, e.to_string()))?;
            log::trace!("{}:{line_no}: {line:?}", self.source);
            self.line(line_no, line)?;
        }
        self.close_to(0);
        Ok(self.root)
    }

    fn line(&mut self, line_no: usize, line: Line<'_>) -> Result<(), BuildError> {
        match line {
            Line::Encoding(name) => {
                if !same_encoding(name, self.encoding) {
                    return Err(BuildError::Redecode { encoding: name.to_owned(), line: line_no });
                }
                self.pending = None;
            }
            Line::Comment => {}
            Line::CloseSet { depth } => {
                if depth > self.height() {
                    return Err(self.err(line_no, "closing a set that is not open").into());
                }
                self.close_to(depth - 1);
                self.pending = None;
            }
            Line::OpenSet { depth, name } => {
                if depth > self.height() {
                    return Err(self.err(line_no, "accessing child set with no parent").into());
                }
                self.close_to(depth - 1);
                self.check_name(line_no, name)?;
                let index = self.current().open_set(name);
                self.scopes.push(OpenSet { index, name: name.to_owned(), tree: RawTree::default() });
                self.pending = None;
            }
            Line::Attribute { name } => {
                self.check_name(line_no, name)?;
                self.pending = Some(name.to_owned());
            }
            Line::InlineAttribute { name, value } => {
                self.check_name(line_no, name)?;
                self.current().assign_text(name, value);
                self.pending = None;
            }
            Line::Reference { name, path, scope } => {
                self.check_name(line_no, name)?;
                let source = self.source.clone();
                self.current()
                    .declare_reference(name, path, || Reference::new(path, scope, line_no, source));
                self.pending = None;
            }
            Line::Text { text, newline } => {
                let Some(name) = self.pending.take() else {
                    return Err(self.err(line_no, "text with no attribute").into());
                };
                let set = self.current();
                set.append_text(&name, text);
                if newline {
                    set.append_text(&name, "\n");
                }
                self.pending = Some(name);
            }
        }
        Ok(())
    }
}

/// Build the raw tree for `src`, which was decoded as `encoding`.
pub fn build(src: &str, encoding: &str, source: &str) -> Result<RawTree, BuildError> {
    Builder::new(encoding, source).build(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::STRING_SOURCE;
    use crate::tree::{RawNode, Scope};

    fn ok(src: &str) -> RawTree {
        build(src, "utf-8", STRING_SOURCE).unwrap()
    }

    fn err(src: &str) -> LangError {
        match build(src, "utf-8", STRING_SOURCE) {
            Err(BuildError::Lang(e)) => e,
            other => panic!("expected a LangError, got {other:?}"),
        }
    }

    fn text(tree: &RawTree, name: &str) -> String {
        match tree.get(name) {
            Some(RawNode::Text(s)) => s.clone(),
            other => panic!("expected text at {name}, got {other:?}"),
        }
    }

    fn set<'t>(tree: &'t RawTree, name: &str) -> &'t RawTree {
        match tree.get(name) {
            Some(RawNode::Set(s)) => s,
            other => panic!("expected a set at {name}, got {other:?}"),
        }
    }

    #[test]
    fn continuation_keeps_newlines() {
        let tree = ok("@greeting\nHello\n  world\n");
        assert_eq!(text(&tree, "greeting"), "Hello\nworld\n");
    }

    #[test]
    fn ampersand_suppresses_newline() {
        let tree = ok("@greeting\n&Hello\n& there\n");
        assert_eq!(text(&tree, "greeting"), "Hello there");
    }

    #[test]
    fn backslash_escapes_markers() {
        let tree = ok("@raw\n\\$not_a_set\n\\@not_attr\n\\\n&\\");
        assert_eq!(text(&tree, "raw"), "$not_a_set\n@not_attr\n\n\\");
    }

    #[test]
    fn comments_do_not_end_an_attribute() {
        let tree = ok("@a\none\n:: skipped\ntwo\n");
        assert_eq!(text(&tree, "a"), "one\ntwo\n");
    }

    #[test]
    fn blank_lines_are_dropped() {
        let tree = ok("@a\none\n\n   \ntwo");
        assert_eq!(text(&tree, "a"), "one\ntwo\n");
    }

    #[test]
    fn attribute_without_text_is_absent() {
        let tree = ok("@a\n@b:1");
        assert!(tree.get("a").is_none());
        assert_eq!(text(&tree, "b"), "1");
    }

    #[test]
    fn continuation_appends_to_existing_string() {
        let tree = ok("@x:1\n@x\n&2");
        assert_eq!(text(&tree, "x"), "12");
    }

    #[test]
    fn sibling_sets_close_deeper_ones() {
        let tree = ok("$a\n  $$b\n$c\n");
        assert!(set(set(&tree, "a"), "b").is_empty());
        assert!(set(&tree, "c").is_empty());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn close_marker_returns_to_parent() {
        let tree = ok("$a\n  $$b\n  $$!\n  @x:in_a\n$!\n@y:in_root");
        assert_eq!(text(set(&tree, "a"), "x"), "in_a");
        assert_eq!(text(&tree, "y"), "in_root");
    }

    #[test]
    fn close_marker_ends_pending_attribute() {
        let e = err("$a\n@x\n$!\nstray");
        assert_eq!((e.line, e.message.as_str()), (4, "text with no attribute"));
    }

    #[test]
    fn reopening_a_set_replaces_it() {
        let tree = ok("$a\n@x:1\n$a\n@y:2");
        let a = set(&tree, "a");
        assert!(a.get("x").is_none());
        assert_eq!(text(a, "y"), "2");
    }

    #[test]
    fn references_are_recorded() {
        let tree = ok("$a\n  .~@local:x.y\n~@abs:a.local");
        match set(&tree, "a").get("local") {
            Some(RawNode::Reference(r)) => {
                assert_eq!(r.path, ["x", "y"]);
                assert_eq!(r.scope, Scope::Relative);
                assert_eq!(r.line, 2);
            }
            other => panic!("expected a reference, got {other:?}"),
        }
        assert!(matches!(tree.get("abs"), Some(RawNode::Reference(r)) if r.scope == Scope::Absolute));
    }

    #[test]
    fn redeclared_reference_extends_it() {
        let tree = ok("~@a:x.y\n@a:1\n~@a:2\n.~@a:3\n");
        match tree.get("a") {
            Some(RawNode::Reference(r)) => {
                assert_eq!((r.dotted().as_str(), r.suffix.as_str()), ("x.y", "123"));
                assert_eq!(r.scope, Scope::Absolute);
            }
            other => panic!("expected a reference, got {other:?}"),
        }
    }

    #[test]
    fn nested_sets_keep_their_place() {
        let tree = ok("@first:1\n$a\n  $$b\n    @x:1\n  $$!\n  @y:2\n$!\n@last:3\n");
        let names: Vec<_> = tree.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["first", "a", "last"]);
        assert_eq!(text(set(set(&tree, "a"), "b"), "x"), "1");
        assert_eq!(text(set(&tree, "a"), "y"), "2");
    }

    #[test]
    fn sets_still_open_at_the_end_are_kept() {
        let tree = ok("$a\n  $$b\n    $$$c\n      @x:deep");
        assert_eq!(text(set(set(set(&tree, "a"), "b"), "c"), "x"), "deep");
    }

    #[test]
    fn text_after_reference_extends_it() {
        let tree = ok("~@a:x.y\n@a\n&!\n@a: done");
        match tree.get("a") {
            Some(RawNode::Reference(r)) => assert_eq!(r.suffix, "! done"),
            other => panic!("expected a reference, got {other:?}"),
        }
    }

    #[test]
    fn structural_errors() {
        let e = err("$$a");
        assert_eq!((e.line, e.message.as_str()), (1, "accessing child set with no parent"));
        let e = err("$a\n\n$$$c");
        assert_eq!((e.line, e.message.as_str()), (3, "accessing child set with no parent"));
        let e = err("$$!");
        assert_eq!(e.message, "closing a set that is not open");
        let e = err("orphan");
        assert_eq!(e.message, "text with no attribute");
    }

    #[test]
    fn naming_errors() {
        assert_eq!(err("$9lives").message, "name '9lives' is not valid");
        assert_eq!(err("@").message, "name '' is not valid");
        assert_eq!(err("@bad name:x").message, "name 'bad name' is not valid");
        assert_eq!(err("~@a-b:x").message, "name 'a-b' is not valid");
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(err("~@a").message, "expected ':'");
        assert_eq!(err(".~@a:b:c").message, "invalid syntax");
    }

    #[test]
    fn depth_is_checked_before_the_name() {
        assert_eq!(err("$$$!!").message, "accessing child set with no parent");
    }

    #[test]
    fn encoding_mismatch_requests_redecode() {
        assert!(build("%=UTF8\n@a:1", "utf-8", STRING_SOURCE).is_ok());
        assert_eq!(
            build("%=latin1\n@a:1", "utf-8", STRING_SOURCE),
            Err(BuildError::Redecode { encoding: "latin1".into(), line: 1 })
        );
    }

    #[test]
    fn encoding_declaration_ends_pending_attribute() {
        let e = err("@a\n%=utf-8\ntext");
        assert_eq!(e.message, "text with no attribute");
    }

    #[test]
    fn errors_carry_source_name() {
        match build("$$x", "utf-8", "ui/menu.lang") {
            Err(BuildError::Lang(e)) => {
                assert_eq!(e.to_string(), "File \"ui/menu.lang\", line 1 - accessing child set with no parent");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
