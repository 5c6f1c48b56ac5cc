//! Per-site exceptions to tracker blocking.
//!
//! An entity list maps a first-party host to the third-party hosts it may
//! load even when a blocklist category names them. Allowances registered for
//! a domain apply to that domain and all of its subdomains, never to its
//! parent domains.

use crate::error::Result;
use crate::trie::{Trie, WhiteListTrie};
use crate::types::{host_from_url, HostKey};

/// First party -> allowed third parties
#[derive(Debug, Clone, Default)]
pub struct EntityList {
    entities: WhiteListTrie,
}

impl EntityList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the third parties `first_party` may load unblocked.
    ///
    /// `first_party` is a reversed host key. Registering the same key again
    /// replaces its allow-list.
    pub fn put_white_list<K: AsRef<str>>(&mut self, first_party: K, allowed: Trie) -> Result<()> {
        self.entities.put_white_list(first_party, allowed)?;
        Ok(())
    }

    /// Whether the page at `page_url` may load `resource_url` unblocked.
    ///
    /// Returns `false` when either URL has no host.
    pub fn is_white_listed(&self, page_url: &str, resource_url: &str) -> bool {
        match (host_from_url(page_url), host_from_url(resource_url)) {
            (Some(page_host), Some(resource_host)) => {
                self.is_white_listed_host(&page_host, &resource_host)
            }
            _ => false,
        }
    }

    /// Host-level variant of [`EntityList::is_white_listed`].
    pub fn is_white_listed_host(&self, page_host: &str, resource_host: &str) -> bool {
        self.is_white_listed_key(
            &HostKey::from_host(page_host),
            &HostKey::from_host(resource_host),
        )
    }

    /// Checks the page's own entry first, then each ancestor domain's entry.
    pub(crate) fn is_white_listed_key(&self, page: &HostKey, resource: &HostKey) -> bool {
        if page.is_empty() || resource.is_empty() {
            return false;
        }

        self.entities
            .boundary_matches(page)
            .iter()
            .rev()
            .filter_map(|node| node.whitelist())
            .any(|allowed| allowed.find_node(resource).is_some())
    }

    /// Number of first parties with an entry
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow(hosts: &[&str]) -> Trie {
        let mut trie = Trie::create_root_node();
        for host in hosts {
            trie.put(HostKey::from_host(host)).unwrap();
        }
        trie
    }

    /// mozilla.org may use foo.com; foo.mozilla.org may also use bar.com
    fn mozilla_entities() -> EntityList {
        let mut list = EntityList::new();
        list.put_white_list(HostKey::from_host("mozilla.org"), allow(&["foo.com"]))
            .unwrap();
        list.put_white_list(HostKey::from_host("foo.mozilla.org"), allow(&["bar.com"]))
            .unwrap();
        list
    }

    #[test]
    fn test_direct_entries() {
        let list = mozilla_entities();
        assert_eq!(list.len(), 2);

        assert!(list.is_white_listed("http://mozilla.org", "http://foo.com"));
        assert!(!list.is_white_listed("http://mozilla.org", "http://bar.com"));
        assert!(list.is_white_listed("http://foo.mozilla.org", "http://foo.com"));
        assert!(list.is_white_listed("http://foo.mozilla.org", "http://bar.com"));
    }

    #[test]
    fn test_unrelated_pages() {
        let list = mozilla_entities();
        assert!(!list.is_white_listed("http://bar.com", "http://bar.com"));
        assert!(!list.is_white_listed("http://bar.com", "http://mozilla.org"));
    }

    #[test]
    fn test_page_subdomains_inherit() {
        let list = mozilla_entities();
        assert!(list.is_white_listed("http://hello.foo.mozilla.org", "http://foo.com"));
        assert!(list.is_white_listed("http://hello.foo.mozilla.org", "http://bar.com"));
        assert!(list.is_white_listed("http://hello.mozilla.org", "http://foo.com"));
        assert!(!list.is_white_listed("http://hello.mozilla.org", "http://bar.com"));
    }

    #[test]
    fn test_paths_and_queries_ignored() {
        let list = mozilla_entities();
        assert!(list.is_white_listed(
            "http://mozilla.org/somewhere",
            "http://foo.com/somewhereElse/bla/bla"
        ));
        assert!(!list.is_white_listed(
            "http://mozilla.org/another/page.html?u=a",
            "http://bar.com/hello"
        ));
        assert!(list.is_white_listed(
            "http://foo.mozilla.org/another/page.html?u=a",
            "http://bar.com/hello"
        ));
    }

    #[test]
    fn test_resource_subdomains_allowed() {
        let list = mozilla_entities();
        assert!(list.is_white_listed("http://mozilla.org", "https://cdn.foo.com/lib.js"));
        assert!(!list.is_white_listed("http://mozilla.org", "https://notfoo.com/lib.js"));
    }

    #[test]
    fn test_data_urls_fail_closed() {
        let list = mozilla_entities();
        assert!(!list.is_white_listed(
            "data:text/html;stuff",
            "http://foo.com/somewhereElse/bla/bla"
        ));
        assert!(!list.is_white_listed("http://mozilla.org", "data:image/png;base64,AAAA"));
        assert!(!list.is_white_listed_host("", "foo.com"));
    }

    #[test]
    fn test_empty_list() {
        let list = EntityList::new();
        assert!(list.is_empty());
        assert!(!list.is_white_listed("http://mozilla.org", "http://foo.com"));
    }
}
