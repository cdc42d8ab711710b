//! Replaces every [`Reference`] in a [`RawTree`] with the value it points to.
//!
//! References are resolved on demand and memoised by the location of the
//! entry that declares them, so a reference may point forwards, or through
//! other references, in any order. Chains are followed with an explicit
//! stack of pending references rather than by recursion, so their length is
//! bounded by memory only. A reference that is reached again while it is
//! still pending is reported as circular.

use std::collections::{HashMap, HashSet};

use crate::error::LangError;
use crate::tree::{Node, RawNode, RawTree, Reference, Scope, Tree};

/// Path of entry names from the root.
type Location = Vec<String>;

enum Cursor<'a> {
    Raw(&'a RawTree),
    Resolved(Node),
}

/// Outcome of one attempt at a pending reference.
enum Step<'a> {
    Done(Node),
    /// The path runs through another reference that is not resolved yet.
    Needs(Location, &'a Reference),
}

struct Resolver<'a> {
    root: &'a RawTree,
    done: HashMap<Location, Node>,
    active: HashSet<Location>,
}

fn circular(r: &Reference) -> LangError {
    r.error(format!("reference '{}' is circular", r.dotted()))
}

impl<'a> Resolver<'a> {
    fn tree(&mut self, raw: &'a RawTree, loc: &mut Location) -> Result<Tree, LangError> {
        let mut out = Tree::default();
        for (name, node) in raw {
            loc.push(name.clone());
            let resolved = match node {
                RawNode::Text(s) => Node::Text(s.clone()),
                RawNode::Set(child) => Node::Set(self.tree(child, loc)?),
                RawNode::Reference(r) => self.reference(r, loc)?,
            };
            loc.pop();
            out.insert(name.clone(), resolved);
        }
        Ok(out)
    }

    fn reference(&mut self, r: &'a Reference, loc: &[String]) -> Result<Node, LangError> {
        if let Some(node) = self.done.get(loc) {
            return Ok(node.clone());
        }
        if !self.active.insert(loc.to_vec()) {
            return Err(circular(r));
        }

        let mut pending: Vec<(Location, &'a Reference)> = vec![(loc.to_vec(), r)];
        let mut last = None;
        while let Some((at, current)) = pending.last() {
            match self.step(at, *current)? {
                Step::Needs(next, inner) => {
                    if !self.active.insert(next.clone()) {
                        return Err(circular(inner));
                    }
                    pending.push((next, inner));
                }
                Step::Done(node) => {
                    let at = at.clone();
                    pending.pop();
                    self.active.remove(&at);
                    self.done.insert(at, node.clone());
                    last = Some(node);
                }
            }
        }
        // The first entry pushed is the last one popped.
        last.ok_or_else(|| circular(r))
    }

    /// Try to resolve the reference declared at `loc`.
    fn step(&mut self, loc: &[String], r: &'a Reference) -> Result<Step<'a>, LangError> {
        let base = match r.scope {
            Scope::Absolute => &[][..],
            Scope::Relative => loc.split_last().map_or(&[][..], |(_, parent)| parent),
        };
        let not_found = || r.error(format!("the value '{}' is not valid", r.dotted()));

        let mut at = base.to_vec();
        let mut cursor = Cursor::Raw(self.raw_set(base).ok_or_else(not_found)?);
        for segment in &r.path {
            cursor = match cursor {
                Cursor::Raw(set) => {
                    at.push(segment.clone());
                    match set.get(segment).ok_or_else(not_found)? {
                        RawNode::Set(child) => Cursor::Raw(child),
                        RawNode::Text(s) => Cursor::Resolved(Node::Text(s.clone())),
                        RawNode::Reference(inner) => match self.done.get(&at) {
                            Some(node) => Cursor::Resolved(node.clone()),
                            None => return Ok(Step::Needs(at, inner)),
                        },
                    }
                }
                // Only reached after passing through a reference to a set.
                Cursor::Resolved(Node::Set(mut set)) => {
                    Cursor::Resolved(set.take(segment).ok_or_else(not_found)?)
                }
                Cursor::Resolved(Node::Text(_)) => return Err(not_found()),
            };
        }

        let target = match cursor {
            Cursor::Raw(set) => Node::Set(self.tree(set, &mut at)?),
            Cursor::Resolved(node) => node,
        };
        match target {
            Node::Text(mut s) => {
                s.push_str(&r.suffix);
                Ok(Step::Done(Node::Text(s)))
            }
            Node::Set(set) if r.suffix.is_empty() => Ok(Step::Done(Node::Set(set))),
            Node::Set(_) => Err(r.error(format!("cannot append text to set '{}'", r.dotted()))),
        }
    }

    fn raw_set(&self, loc: &[String]) -> Option<&'a RawTree> {
        let mut set = self.root;
        for name in loc {
            match set.get(name)? {
                RawNode::Set(child) => set = child,
                _ => return None,
            }
        }
        Some(set)
    }
}

/// Resolve every reference in `raw`.
pub fn resolve(raw: &RawTree) -> Result<Tree, LangError> {
    let mut resolver = Resolver { root: raw, done: HashMap::new(), active: HashSet::new() };
    let tree = resolver.tree(raw, &mut Vec::new())?;
    log::debug!("resolved {} reference(s)", resolver.done.len());
    Ok(tree)
}
