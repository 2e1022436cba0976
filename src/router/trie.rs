//! Segment trie for http-template route matching
//!
//! Every node owns its children exclusively and has three explicit child
//! slots, tried in a fixed precedence order during lookup:
//!
//! 1. a literal map keyed by exact segment text,
//! 2. a single-wildcard (`*`) child,
//! 3. a double-wildcard (`**`) child, which consumes the rest of the path.
//!
//! Terminal bindings live on the node where a route's flattened template
//! ends, keyed by HTTP method and then by custom verb.
//!
//! ## Precedence
//!
//! Lookup is a depth-first search that backtracks to the next alternative at
//! the most recent choice point, so literals beat `*` and `*` beats `**`
//! without explicit priorities. A `**` node never has children (the parser
//! rejects anything after `**`), so the only consumption it can take is the
//! whole remainder.
//!
//! ## Complexity
//!
//! Insertion is O(k) in the number of template segments. Lookup is O(k) in
//! request segments when no literal and wildcard branch both match at the same
//! depth. Each depth where both match can send the search down both branches,
//! so the worst case grows exponentially with the number of such depths along
//! the path, not just with the trie depth.

use http::Method;
use std::collections::HashMap;

use crate::template::SubSegment;

/// Route indices bound at one terminal for one method.
///
/// Candidates are kept in preference order: structurally identical templates
/// bound for the same method and verb are ranked by number of variables
/// (more first), then by registration order.
#[derive(Debug, Clone, Default)]
pub(crate) struct MethodBindings {
    plain: Vec<usize>,
    verbs: HashMap<Box<str>, Vec<usize>>,
}

impl MethodBindings {
    fn candidates(&self, verb: Option<&str>) -> Option<&[usize]> {
        let list = match verb {
            Some(verb) => self.verbs.get(verb)?,
            None => &self.plain,
        };
        (!list.is_empty()).then_some(list.as_slice())
    }

    fn candidates_mut(&mut self, verb: Option<&str>) -> &mut Vec<usize> {
        match verb {
            Some(verb) => self.verbs.entry(Box::from(verb)).or_default(),
            None => &mut self.plain,
        }
    }
}

/// Node of the matcher trie.
#[derive(Debug, Clone, Default)]
pub(crate) struct TrieNode {
    literal_children: HashMap<Box<str>, TrieNode>,
    single_wildcard: Option<Box<TrieNode>>,
    double_wildcard: Option<Box<TrieNode>>,
    bindings: HashMap<Method, MethodBindings>,
}

impl TrieNode {
    /// Walk or create the path for `pattern` and return the terminal node.
    ///
    /// Insertion stops at a `**`: it is always the last flattened segment.
    pub(crate) fn insert_path(&mut self, pattern: &[SubSegment]) -> &mut TrieNode {
        let Some((first, rest)) = pattern.split_first() else {
            return self;
        };
        match first {
            SubSegment::Literal(text) => self
                .literal_children
                .entry(Box::from(text.as_str()))
                .or_default()
                .insert_path(rest),
            SubSegment::SingleWildcard => self
                .single_wildcard
                .get_or_insert_with(Box::default)
                .insert_path(rest),
            SubSegment::DoubleWildcard => &mut **self.double_wildcard.get_or_insert_with(Box::default),
        }
    }

    /// Terminal node for `pattern` if it has already been inserted.
    pub(crate) fn get_path(&self, pattern: &[SubSegment]) -> Option<&TrieNode> {
        let Some((first, rest)) = pattern.split_first() else {
            return Some(self);
        };
        match first {
            SubSegment::Literal(text) => self.literal_children.get(text.as_str())?.get_path(rest),
            SubSegment::SingleWildcard => self.single_wildcard.as_deref()?.get_path(rest),
            SubSegment::DoubleWildcard => self.double_wildcard.as_deref(),
        }
    }

    /// Routes bound here for `(method, verb)`, in preference order.
    pub(crate) fn bound(&self, method: &Method, verb: Option<&str>) -> &[usize] {
        self.bindings
            .get(method)
            .and_then(|bindings| bindings.candidates(verb))
            .unwrap_or_default()
    }

    /// Candidate list for `(method, verb)` at this node, created on demand.
    pub(crate) fn bindings_mut(&mut self, method: Method, verb: Option<&str>) -> &mut Vec<usize> {
        self.bindings.entry(method).or_default().candidates_mut(verb)
    }

    /// Preferred route bound here for `method` and `verb`.
    pub(crate) fn terminal(&self, method: &Method, verb: Option<&str>) -> Option<usize> {
        self.bindings
            .get(method)?
            .candidates(verb)
            .and_then(|list| list.first().copied())
    }

    /// Methods bound here for `verb`.
    pub(crate) fn methods<'a>(
        &'a self,
        verb: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Method> + 'a {
        self.bindings
            .iter()
            .filter(move |(_, bindings)| bindings.candidates(verb).is_some())
            .map(|(method, _)| method)
    }

    /// Depth-first search in precedence order.
    ///
    /// `accept` is called on every node where the request path is fully
    /// consumed; the first `Some` it returns ends the search. Returning `None`
    /// backtracks to the next alternative.
    pub(crate) fn search<'t, R>(
        &'t self,
        segments: &[&str],
        accept: &mut impl FnMut(&'t TrieNode) -> Option<R>,
    ) -> Option<R> {
        let Some((segment, rest)) = segments.split_first() else {
            if let Some(found) = accept(self) {
                return Some(found);
            }
            // `**` also matches zero segments.
            return self.double_wildcard.as_deref().and_then(|node| accept(node));
        };

        if let Some(child) = self.literal_children.get(*segment) {
            if let Some(found) = child.search(rest, accept) {
                return Some(found);
            }
        }

        if !segment.is_empty() {
            if let Some(child) = self.single_wildcard.as_deref() {
                if let Some(found) = child.search(rest, accept) {
                    return Some(found);
                }
            }
        }

        self.double_wildcard.as_deref().and_then(|node| accept(node))
    }

    /// Number of nodes in this subtree, including `self`.
    pub(crate) fn node_count(&self) -> usize {
        1 + self
            .literal_children
            .values()
            .map(TrieNode::node_count)
            .sum::<usize>()
            + self.single_wildcard.as_deref().map_or(0, TrieNode::node_count)
            + self.double_wildcard.as_deref().map_or(0, TrieNode::node_count)
    }
}
