//! Character tries with domain-aware lookup.
//!
//! Keys are stored byte by byte in an index-based arena. Lookup treats `.`
//! as a segment boundary, so a trie holding reversed host keys answers
//! "is this host or one of its ancestors listed" in a single walk:
//!
//! ```
//! use tracking_matcher::{HostKey, Trie};
//!
//! let mut trie = Trie::create_root_node();
//! trie.put(HostKey::from_host("example.com")).unwrap();
//!
//! assert!(trie.find_node(HostKey::from_host("example.com")).is_some());
//! assert!(trie.find_node(HostKey::from_host("a.b.example.com")).is_some());
//! assert!(trie.find_node(HostKey::from_host("otherexample.com")).is_none());
//! ```

mod whitelist;

pub use whitelist::WhiteListTrie;

use crate::error::{MatcherError, Result};

/// Segment separator for domain keys
const BOUNDARY: u8 = b'.';

/// Arena index of the root node
const ROOT: NodeId = NodeId(0);

/// Handle to a node inside one trie's arena.
///
/// Only meaningful for the trie that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a terminal node carries
#[derive(Debug, Clone)]
pub enum TerminalKind {
    /// Inserted with `put`
    Plain,
    /// Inserted with `WhiteListTrie::put_white_list`
    WithWhitelist(Trie),
}

#[derive(Debug, Clone, Default)]
struct Node {
    /// Outgoing edges, kept small and scanned linearly
    children: Vec<(u8, NodeId)>,
    terminal: Option<TerminalKind>,
}

/// A terminal node returned by a lookup
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    id: NodeId,
    kind: &'a TerminalKind,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &'a TerminalKind {
        self.kind
    }

    /// Attached whitelist, if the node was inserted with one
    pub fn whitelist(&self) -> Option<&'a Trie> {
        match self.kind {
            TerminalKind::Plain => None,
            TerminalKind::WithWhitelist(trie) => Some(trie),
        }
    }
}

/// Character trie over arbitrary string keys
#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<Node>,
    terminals: usize,
}

impl Default for Trie {
    fn default() -> Self {
        Self::create_root_node()
    }
}

impl Trie {
    /// Create an empty trie holding only the (non-terminal) root.
    pub fn create_root_node() -> Self {
        Self {
            nodes: vec![Node::default()],
            terminals: 0,
        }
    }

    /// Insert `key` and mark its final node terminal.
    ///
    /// Inserting an existing key returns the same node and leaves any
    /// attached whitelist in place. Empty keys are rejected.
    pub fn put<K: AsRef<str>>(&mut self, key: K) -> Result<NodeId> {
        let id = self.insert_path(key.as_ref())?;
        self.mark_terminal(id, TerminalKind::Plain, false);
        Ok(id)
    }

    /// Find the shallowest terminal node on `query`'s path that ends on a
    /// segment boundary.
    ///
    /// A position is a boundary when the next byte is `.` or the query is
    /// exhausted. Returns `None` as soon as the path leaves the trie, so a
    /// stored `com.example` matches `com.example.sub` but neither
    /// `com.examplefoo` nor `com.exampl`.
    pub fn find_node<K: AsRef<str>>(&self, query: K) -> Option<NodeRef<'_>> {
        let query = query.as_ref().as_bytes();
        let mut current = ROOT;

        for (i, &byte) in query.iter().enumerate() {
            current = self.child(current, byte)?;
            if is_boundary(query, i) {
                if let Some(node) = self.terminal(current) {
                    return Some(node);
                }
            }
        }

        None
    }

    /// Every boundary terminal on `query`'s path, shallowest first.
    ///
    /// Unlike [`Trie::find_node`] this does not stop at the first hit.
    pub fn boundary_matches<K: AsRef<str>>(&self, query: K) -> Vec<NodeRef<'_>> {
        let query = query.as_ref().as_bytes();
        let mut found = Vec::new();
        let mut current = ROOT;

        for (i, &byte) in query.iter().enumerate() {
            current = match self.child(current, byte) {
                Some(next) => next,
                None => break,
            };
            if is_boundary(query, i) {
                if let Some(node) = self.terminal(current) {
                    found.push(node);
                }
            }
        }

        found
    }

    /// Exact lookup: `key` itself must have been inserted.
    pub fn contains<K: AsRef<str>>(&self, key: K) -> bool {
        let mut current = ROOT;
        for &byte in key.as_ref().as_bytes() {
            match self.child(current, byte) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.terminal(current).is_some()
    }

    /// Number of distinct keys inserted
    pub fn len(&self) -> usize {
        self.terminals
    }

    pub fn is_empty(&self) -> bool {
        self.terminals == 0
    }

    /// Number of arena nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn insert_path(&mut self, key: &str) -> Result<NodeId> {
        if key.is_empty() {
            return Err(MatcherError::EmptyKey);
        }

        let mut current = ROOT;
        for &byte in key.as_bytes() {
            current = match self.child(current, byte) {
                Some(next) => next,
                None => {
                    let next = NodeId(self.nodes.len());
                    self.nodes.push(Node::default());
                    self.nodes[current.0].children.push((byte, next));
                    next
                }
            };
        }

        Ok(current)
    }

    /// Set the terminal kind of `id`. Without `replace`, an existing terminal
    /// is kept as is.
    fn mark_terminal(&mut self, id: NodeId, kind: TerminalKind, replace: bool) {
        let node = &mut self.nodes[id.0];
        match node.terminal {
            None => {
                node.terminal = Some(kind);
                self.terminals += 1;
            }
            Some(_) if replace => node.terminal = Some(kind),
            Some(_) => {}
        }
    }

    #[inline]
    fn child(&self, id: NodeId, byte: u8) -> Option<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .find(|(b, _)| *b == byte)
            .map(|(_, next)| *next)
    }

    #[inline]
    fn terminal(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.nodes[id.0]
            .terminal
            .as_ref()
            .map(|kind| NodeRef { id, kind })
    }
}

/// True when the byte after position `i` is a boundary or there is none.
#[inline]
fn is_boundary(query: &[u8], i: usize) -> bool {
    query.get(i + 1).map_or(true, |&next| next == BOUNDARY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HostKey;

    fn key(host: &str) -> HostKey {
        HostKey::from_host(host)
    }

    #[test]
    fn test_empty_trie() {
        let trie = Trie::create_root_node();
        assert!(trie.is_empty());
        assert_eq!(trie.node_count(), 1);
        assert!(trie.find_node("hello").is_none());
        assert!(trie.find_node("").is_none());
    }

    #[test]
    fn test_put_then_find() {
        let mut trie = Trie::create_root_node();
        let put = trie.put("hello").unwrap();
        let found = trie.find_node("hello").unwrap();
        assert_eq!(put, found.id());
        assert!(found.whitelist().is_none());
    }

    #[test]
    fn test_no_partial_string_match() {
        let mut trie = Trie::create_root_node();
        trie.put("hello").unwrap();
        assert!(trie.find_node("hell").is_none());
        assert!(trie.find_node("hellop").is_none());
    }

    #[test]
    fn test_overlapping_keys() {
        let mut trie = Trie::create_root_node();
        trie.put("hello").unwrap();
        trie.put("hellohello").unwrap();

        assert!(trie.find_node("hello").is_some());
        assert!(trie.find_node("hellohello").is_some());
        assert!(trie.find_node("hell").is_none());
        assert!(trie.find_node("hellop").is_none());
    }

    #[test]
    fn test_put_is_idempotent() {
        let mut trie = Trie::create_root_node();
        let first = trie.put("example").unwrap();
        let nodes = trie.node_count();
        let second = trie.put("example").unwrap();

        assert_eq!(first, second);
        assert_eq!(trie.node_count(), nodes);
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut trie = Trie::create_root_node();
        assert!(matches!(trie.put(""), Err(MatcherError::EmptyKey)));
        assert!(trie.is_empty());
    }

    #[test]
    fn test_domain_and_subdomains() {
        let mut trie = Trie::create_root_node();
        trie.put(key("foo.com")).unwrap();

        assert!(trie.find_node(key("foo.com")).is_some());
        assert!(trie.find_node(key("bar.foo.com")).is_some());
        assert!(trie.find_node(key("a.b.foo.com")).is_some());

        assert!(trie.find_node(key("bar-foo.com")).is_none());
        assert!(trie.find_node(key("oo.com")).is_none());
        assert!(trie.find_node(key("foo.com.evil")).is_none());
        assert!(trie.find_node(key("com")).is_none());
    }

    #[test]
    fn test_shallowest_match_wins() {
        let mut trie = Trie::create_root_node();
        let broad = trie.put(key("example.com")).unwrap();
        let narrow = trie.put(key("ads.example.com")).unwrap();
        assert_ne!(broad, narrow);

        let found = trie.find_node(key("ads.example.com")).unwrap();
        assert_eq!(found.id(), broad);
    }

    #[test]
    fn test_boundary_matches_collects_all_levels() {
        let mut trie = Trie::create_root_node();
        let outer = trie.put(key("mozilla.org")).unwrap();
        let inner = trie.put(key("foo.mozilla.org")).unwrap();

        let ids: Vec<NodeId> = trie
            .boundary_matches(key("hello.foo.mozilla.org"))
            .iter()
            .map(|n| n.id())
            .collect();
        assert_eq!(ids, vec![outer, inner]);

        assert_eq!(trie.boundary_matches(key("mozilla.org")).len(), 1);
        assert!(trie.boundary_matches(key("mozilla.com")).is_empty());
    }

    #[test]
    fn test_contains_is_exact() {
        let mut trie = Trie::create_root_node();
        trie.put(key("example.com")).unwrap();

        assert!(trie.contains(key("example.com")));
        assert!(!trie.contains(key("www.example.com")));
        assert!(!trie.contains("com"));
        assert!(!trie.contains(""));
    }

    #[test]
    fn test_case_sensitive() {
        let mut trie = Trie::create_root_node();
        trie.put("com.example").unwrap();
        assert!(trie.find_node("com.Example").is_none());
        assert!(trie.find_node(key("EXAMPLE.com")).is_some());
    }
}
