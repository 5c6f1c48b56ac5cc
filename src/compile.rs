//! Build tries and entity lists from already-parsed blocklist data.
//!
//! Loaders hand over one host per entry. Blank entries and `#` comments are
//! skipped; anything else that is not a plain hostname aborts compilation so
//! a corrupt list never yields a partially built matcher.

use std::collections::BTreeMap;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::entity::EntityList;
use crate::error::{MatcherError, Result};
use crate::trie::Trie;
use crate::types::HostKey;

/// Lowercase hostname: dot-separated labels, no empty labels
static HOST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9_-]+(?:\.[a-z0-9_-]+)*$")
        .expect("HOST_PATTERN: hardcoded regex is invalid")
});

/// One entity-list record: sites owned by an entity and the third parties
/// those sites may load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityEntry {
    /// Entity name, used in error messages
    pub name: String,
    /// First-party hosts
    pub properties: Vec<String>,
    /// Third-party hosts allowed on every property
    pub resources: Vec<String>,
}

impl EntityEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_properties<S: AsRef<str>>(mut self, hosts: &[S]) -> Self {
        self.properties
            .extend(hosts.iter().map(|h| h.as_ref().to_string()));
        self
    }

    pub fn with_resources<S: AsRef<str>>(mut self, hosts: &[S]) -> Self {
        self.resources
            .extend(hosts.iter().map(|h| h.as_ref().to_string()));
        self
    }
}

/// Normalize one list entry.
///
/// Returns `Ok(None)` for blank and comment-only entries.
fn parse_host_entry(entry: &str, list: &str, line: usize) -> Result<Option<String>> {
    let entry = match entry.find('#') {
        Some(comment_pos) => &entry[..comment_pos],
        None => entry,
    };
    let entry = entry.trim();
    if entry.is_empty() {
        return Ok(None);
    }

    let host = entry.strip_suffix('.').unwrap_or(entry).to_ascii_lowercase();
    if !HOST_PATTERN.is_match(&host) {
        return Err(MatcherError::InvalidHost {
            list: list.to_string(),
            line,
            host: entry.to_string(),
        });
    }

    Ok(Some(host))
}

/// Normalize every entry of `hosts`, dropping blanks and comments.
fn parse_hosts<S: AsRef<str>>(hosts: &[S], list: &str) -> Result<Vec<String>> {
    let mut parsed = Vec::with_capacity(hosts.len());
    for (index, entry) in hosts.iter().enumerate() {
        if let Some(host) = parse_host_entry(entry.as_ref(), list, index + 1)? {
            parsed.push(host);
        }
    }
    Ok(parsed)
}

/// Insert `hosts`, returning how many were already present.
fn extend_trie(trie: &mut Trie, hosts: &[String]) -> Result<usize> {
    let mut duplicates = 0;
    for host in hosts {
        let key = HostKey::from_host(host);
        if trie.contains(&key) {
            duplicates += 1;
            continue;
        }
        trie.put(key)?;
    }
    Ok(duplicates)
}

/// Compile a blocklist category from its host entries.
pub fn compile_category_trie<S: AsRef<str>>(list: &str, hosts: &[S]) -> Result<Trie> {
    let parsed = parse_hosts(hosts, list)?;
    let mut trie = Trie::create_root_node();
    let duplicates = extend_trie(&mut trie, &parsed)?;
    if duplicates > 0 {
        debug!("category '{}': skipped {} duplicate hosts", list, duplicates);
    }

    info!(
        "compiled category '{}': {} entries, {} distinct hosts, {} nodes",
        list,
        parsed.len(),
        trie.len(),
        trie.node_count()
    );

    Ok(trie)
}

/// Compile an entity list.
///
/// A property named by several entries receives the union of their
/// resources.
pub fn compile_entity_list(entries: &[EntityEntry]) -> Result<EntityList> {
    let mut merged: BTreeMap<String, Trie> = BTreeMap::new();

    for entry in entries {
        let list = format!("entity '{}'", entry.name);
        let properties = parse_hosts(&entry.properties, &format!("{list} properties"))?;
        let resources = parse_hosts(&entry.resources, &format!("{list} resources"))?;
        if resources.is_empty() {
            debug!("{} allows no third parties", list);
        }

        for property in properties {
            extend_trie(merged.entry(property).or_default(), &resources)?;
        }
    }

    let mut entity_list = EntityList::new();
    for (property, whitelist) in merged {
        entity_list.put_white_list(HostKey::from_host(&property), whitelist)?;
    }

    info!(
        "compiled entity list: {} entities, {} first parties",
        entries.len(),
        entity_list.len()
    );

    Ok(entity_list)
}
