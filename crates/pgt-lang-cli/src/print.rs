//! Indented listings of resolved and raw trees.

use std::io::{self, Write};

use pgt_lang::{Node, RawNode, RawTree, Scope, Tree};

const INDENT: &str = "  ";

/// `name = "value"` per attribute, `name:` followed by indented entries
/// per set.
pub fn write_tree(out: &mut impl Write, tree: &Tree) -> io::Result<()> {
    write_tree_at(out, tree, 0)
}

fn write_tree_at(out: &mut impl Write, tree: &Tree, depth: usize) -> io::Result<()> {
    let indent = INDENT.repeat(depth);
    for (name, node) in tree {
        match node {
            Node::Text(s) => writeln!(out, "{indent}{name} = {s:?}")?,
            Node::Set(child) => {
                writeln!(out, "{indent}{name}:")?;
                write_tree_at(out, child, depth + 1)?;
            }
        }
    }
    Ok(())
}

/// Like [`write_tree`], with references shown as `~path` or `.~path`.
pub fn write_raw(out: &mut impl Write, tree: &RawTree) -> io::Result<()> {
    write_raw_at(out, tree, 0)
}

fn write_raw_at(out: &mut impl Write, tree: &RawTree, depth: usize) -> io::Result<()> {
    let indent = INDENT.repeat(depth);
    for (name, node) in tree {
        match node {
            RawNode::Text(s) => writeln!(out, "{indent}{name} = {s:?}")?,
            RawNode::Set(child) => {
                writeln!(out, "{indent}{name}:")?;
                write_raw_at(out, child, depth + 1)?;
            }
            RawNode::Reference(r) => {
                let marker = match r.scope {
                    Scope::Absolute => "~",
                    Scope::Relative => ".~",
                };
                write!(out, "{indent}{name} = {marker}{}", r.dotted())?;
                if !r.suffix.is_empty() {
                    write!(out, " + {:?}", r.suffix)?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// A single value: text verbatim, a set as a listing.
pub fn write_node(out: &mut impl Write, node: &Node) -> io::Result<()> {
    match node {
        Node::Text(s) => {
            out.write_all(s.as_bytes())?;
            if !s.ends_with('\n') {
                writeln!(out)?;
            }
            Ok(())
        }
        Node::Set(tree) => write_tree(out, tree),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn resolved_listing() {
        let tree = pgt_lang::loads("$a\n  @x:1\n$!\n@y\nline\n").unwrap();
        let text = render(|out| write_tree(out, &tree));
        assert_eq!(text, "a:\n  x = \"1\"\ny = \"line\\n\"\n");
    }

    #[test]
    fn raw_listing_shows_references() {
        let raw = pgt_lang::loads_raw("$a\n  .~@r:x\n$!\n~@y:a.x\n@y:!\n").unwrap();
        let text = render(|out| write_raw(out, &raw));
        assert_eq!(text, "a:\n  r = .~x\ny = ~a.x + \"!\"\n");
    }

    #[test]
    fn single_values() {
        let tree = pgt_lang::loads("$a\n  @x:1\n$!\n@multi\nline\n").unwrap();
        let text = render(|out| write_node(out, tree.get("a.x").unwrap()));
        assert_eq!(text, "1\n");
        let text = render(|out| write_node(out, tree.get("multi").unwrap()));
        assert_eq!(text, "line\n");
        let text = render(|out| write_node(out, tree.get("a").unwrap()));
        assert_eq!(text, "x = \"1\"\n");
    }
}
