use super::{NodeId, NodeRef, TerminalKind, Trie};
use crate::error::Result;

/// Trie whose terminal nodes may carry a nested allow-list trie.
///
/// Lookup is identical to [`Trie`]; the second level is reached through
/// [`NodeRef::whitelist`] on the returned node.
#[derive(Debug, Clone, Default)]
pub struct WhiteListTrie {
    inner: Trie,
}

impl WhiteListTrie {
    pub fn create_root_node() -> Self {
        Self {
            inner: Trie::create_root_node(),
        }
    }

    /// Insert `key` and attach `whitelist` to its node, replacing any
    /// whitelist previously attached to that exact key.
    pub fn put_white_list<K: AsRef<str>>(&mut self, key: K, whitelist: Trie) -> Result<NodeId> {
        let id = self.inner.insert_path(key.as_ref())?;
        self.inner
            .mark_terminal(id, TerminalKind::WithWhitelist(whitelist), true);
        Ok(id)
    }

    /// Insert `key` without a whitelist.
    pub fn put<K: AsRef<str>>(&mut self, key: K) -> Result<NodeId> {
        self.inner.put(key)
    }

    pub fn find_node<K: AsRef<str>>(&self, query: K) -> Option<NodeRef<'_>> {
        self.inner.find_node(query)
    }

    pub fn boundary_matches<K: AsRef<str>>(&self, query: K) -> Vec<NodeRef<'_>> {
        self.inner.boundary_matches(query)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
