//! Request blocking decisions.
//!
//! [`UrlMatcher`] answers "should this sub-resource be blocked on this page"
//! by walking every enabled category's trie and then consulting the entity
//! list. Verdicts are memoized in an LRU cache keyed by both hosts, whether
//! the resource is a web font, and the set of enabled categories.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use log::{debug, info, trace};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};

use crate::category::{
    Category, CategoryRule, DefaultCategory, WEB_FONTS_CATEGORY, WEB_FONTS_PREF_KEY,
};
use crate::entity::EntityList;
use crate::error::{MatcherError, Result};
use crate::settings::{MatcherConfig, SettingsStore};
use crate::trie::Trie;
use crate::types::{host_from_url, normalize_host, resource_from_url, CacheKey, HostKey, Verdict};

/// Maximum number of categories (one signature bit each)
pub const MAX_CATEGORIES: usize = 64;

/// Category-aware tracker matcher with a decision cache
pub struct UrlMatcher {
    categories: Vec<Category>,
    entity_list: Option<EntityList>,
    config: MatcherConfig,
    cache: Mutex<LruCache<CacheKey, Verdict>>,
}

impl UrlMatcher {
    pub fn builder() -> UrlMatcherBuilder {
        UrlMatcherBuilder::new()
    }

    /// Matcher with a single always-enabled category holding `hosts`.
    pub fn from_blocked_hosts<S: AsRef<str>>(hosts: &[S]) -> Result<Self> {
        let trie = crate::compile::compile_category_trie("default", hosts)?;
        UrlMatcherBuilder::new()
            .category("default", "", trie)
            .build(&AlwaysEnabled)
    }

    /// Whether the resource at `resource_url` should be blocked when loaded
    /// by the page at `page_url`.
    pub fn matches(&self, resource_url: &str, page_url: &str) -> bool {
        self.check(resource_url, page_url).is_blocked()
    }

    /// Full decision for a resource load.
    ///
    /// A resource without a host is never blocked. A page without a host
    /// still gets category matching, but no entity-list exemption.
    pub fn check(&self, resource_url: &str, page_url: &str) -> Verdict {
        let Some((resource_host, web_font)) = resource_from_url(resource_url) else {
            trace!("no host in resource url, allowing");
            return Verdict::Allowed;
        };
        let page_host = host_from_url(page_url);
        self.decide(resource_host, page_host, web_font)
    }

    /// Host-level variant of [`UrlMatcher::check`].
    ///
    /// Hosts are normalized like list entries, so `Example.COM.` and
    /// `example.com` are the same site. Web-font categories never apply.
    pub fn check_hosts(&self, resource_host: &str, page_host: Option<&str>) -> Verdict {
        self.decide(
            normalize_host(resource_host),
            page_host.map(normalize_host),
            false,
        )
    }

    fn decide(&self, resource_host: String, page_host: Option<String>, web_font: bool) -> Verdict {
        if resource_host.is_empty() {
            return Verdict::Allowed;
        }

        if !web_font && self.is_first_party(&resource_host, page_host.as_deref()) {
            trace!("first-party load of {}", resource_host);
            return Verdict::Allowed;
        }

        let key = CacheKey {
            resource_host,
            page_host,
            web_font,
            signature: self.signature(),
        };

        let cached = self.cache.lock().get(&key).cloned();
        if let Some(verdict) = cached {
            return verdict;
        }

        // Computed outside the lock; a concurrent miss on the same key
        // produces the same verdict.
        let verdict = self.evaluate(&key);
        trace!(
            "{} on {:?}: {:?}",
            key.resource_host,
            key.page_host,
            verdict
        );
        self.cache.lock().put(key, verdict.clone());

        verdict
    }

    fn is_first_party(&self, resource_host: &str, page_host: Option<&str>) -> bool {
        self.config.allow_first_party && page_host == Some(resource_host)
    }

    /// Walk the categories enabled in `key.signature`, then the entity list.
    fn evaluate(&self, key: &CacheKey) -> Verdict {
        let resource = HostKey::from_host(&key.resource_host);
        let first_party = self.is_first_party(&key.resource_host, key.page_host.as_deref());

        let mut enabled = self
            .categories
            .iter()
            .filter(|c| key.signature & c.bit() != 0);

        // Web fonts are blocked regardless of host lists and exemptions
        if key.web_font {
            if let Some(category) = enabled
                .clone()
                .find(|c| !c.is_host_list() && c.covers(&resource, true))
            {
                return Verdict::Blocked {
                    category: category.shared_name(),
                };
            }
        }
        if first_party {
            return Verdict::Allowed;
        }

        let Some(category) = enabled.find(|c| c.is_host_list() && c.covers(&resource, key.web_font))
        else {
            return Verdict::Allowed;
        };

        if let (Some(entity_list), Some(page_host)) = (&self.entity_list, &key.page_host) {
            if entity_list.is_white_listed_key(&HostKey::from_host(page_host), &resource) {
                return Verdict::WhiteListed {
                    category: category.shared_name(),
                };
            }
        }

        Verdict::Blocked {
            category: category.shared_name(),
        }
    }

    /// Bitmask of currently enabled categories
    fn signature(&self) -> u64 {
        self.categories
            .iter()
            .filter(|c| c.is_enabled())
            .fold(0, |sig, c| sig | c.bit())
    }

    /// Enable or disable a category by name.
    pub fn set_category_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let category = self
            .category(name)
            .ok_or_else(|| MatcherError::UnknownCategory(name.to_string()))?;

        if category.set_enabled(enabled) {
            debug!("category '{}' enabled={}", name, enabled);
            self.clear_cache();
        }
        Ok(())
    }

    /// Settings change hook: re-read every category bound to `key`.
    ///
    /// Returns true if any category flag changed. Keys no category is bound
    /// to are ignored.
    pub fn on_setting_changed(&self, key: &str, settings: &dyn SettingsStore) -> bool {
        let mut changed = false;
        for category in self.categories.iter().filter(|c| c.pref_key() == key) {
            let enabled = settings.get_boolean(key, category.default_enabled());
            if category.set_enabled(enabled) {
                debug!(
                    "category '{}' enabled={} (setting '{}')",
                    category.name(),
                    enabled,
                    key
                );
                changed = true;
            }
        }

        if changed {
            self.clear_cache();
        }
        changed
    }

    /// Re-read every category flag from `settings`.
    pub fn reload_settings(&self, settings: &dyn SettingsStore) -> bool {
        let keys: HashSet<&str> = self.categories.iter().map(|c| c.pref_key()).collect();
        keys.into_iter()
            .fold(false, |changed, key| self.on_setting_changed(key, settings) || changed)
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name() == name)
    }

    /// Names of enabled categories, in evaluation order
    pub fn enabled_categories(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|c| c.is_enabled())
            .map(|c| c.name())
            .collect()
    }

    /// Number of cached verdicts
    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        cache.clear();
    }
}

/// Settings store that answers `true` for every key
struct AlwaysEnabled;

impl SettingsStore for AlwaysEnabled {
    fn get_boolean(&self, _key: &str, _default: bool) -> bool {
        true
    }
}

struct PendingCategory {
    name: String,
    pref_key: String,
    default_enabled: bool,
    rule: CategoryRule,
}

/// Builder for [`UrlMatcher`].
///
/// Categories are evaluated in the order they are added.
#[derive(Default)]
pub struct UrlMatcherBuilder {
    categories: Vec<PendingCategory>,
    entity_list: Option<EntityList>,
    config: MatcherConfig,
}

impl UrlMatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category that is enabled unless `pref_key` says otherwise.
    pub fn category(
        self,
        name: impl Into<String>,
        pref_key: impl Into<String>,
        trie: Trie,
    ) -> Self {
        self.category_with_default(name, pref_key, true, trie)
    }

    /// Add the web-font category, bound to [`WEB_FONTS_PREF_KEY`] and off by
    /// default. It blocks any resource whose path ends in a font extension.
    pub fn web_fonts(mut self) -> Self {
        self.categories.push(PendingCategory {
            name: WEB_FONTS_CATEGORY.to_string(),
            pref_key: WEB_FONTS_PREF_KEY.to_string(),
            default_enabled: false,
            rule: CategoryRule::WebFonts,
        });
        self
    }

    /// Add a category with an explicit default for unset preferences.
    pub fn category_with_default(
        mut self,
        name: impl Into<String>,
        pref_key: impl Into<String>,
        default_enabled: bool,
        trie: Trie,
    ) -> Self {
        self.categories.push(PendingCategory {
            name: name.into(),
            pref_key: pref_key.into(),
            default_enabled,
            rule: CategoryRule::Hosts(trie),
        });
        self
    }

    pub fn default_category(self, category: DefaultCategory, trie: Trie) -> Self {
        self.category_with_default(
            category.name(),
            category.pref_key(),
            category.default_enabled(),
            trie,
        )
    }

    pub fn entity_list(mut self, entity_list: EntityList) -> Self {
        self.entity_list = Some(entity_list);
        self
    }

    pub fn config(mut self, config: MatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the matcher, seeding each category flag from `settings`.
    pub fn build(self, settings: &dyn SettingsStore) -> Result<UrlMatcher> {
        if self.categories.len() > MAX_CATEGORIES {
            return Err(MatcherError::TooManyCategories {
                count: self.categories.len(),
                max: MAX_CATEGORIES,
            });
        }

        let mut seen = HashSet::with_capacity(self.categories.len());
        let mut categories = Vec::with_capacity(self.categories.len());
        for (index, pending) in self.categories.into_iter().enumerate() {
            if !seen.insert(pending.name.clone()) {
                return Err(MatcherError::DuplicateCategory(pending.name));
            }

            let enabled = settings.get_boolean(&pending.pref_key, pending.default_enabled);
            match &pending.rule {
                CategoryRule::Hosts(trie) => info!(
                    "category '{}': {} hosts, enabled={}",
                    pending.name,
                    trie.len(),
                    enabled
                ),
                CategoryRule::WebFonts => {
                    info!("category '{}': web fonts, enabled={}", pending.name, enabled)
                }
            }
            categories.push(Category::new(
                Arc::from(pending.name),
                pending.pref_key,
                pending.default_enabled,
                pending.rule,
                enabled,
                index,
            ));
        }

        let cache_size =
            NonZeroUsize::new(self.config.cache_size).unwrap_or(NonZeroUsize::MIN);

        Ok(UrlMatcher {
            categories,
            entity_list: self.entity_list,
            config: self.config,
            cache: Mutex::new(LruCache::new(cache_size)),
        })
    }
}

/// Shared, swappable reference to the current matcher.
///
/// A list update builds a new [`UrlMatcher`] and swaps it in; queries already
/// running finish against the matcher they started with.
pub struct MatcherHandle {
    current: RwLock<Arc<UrlMatcher>>,
}

impl MatcherHandle {
    pub fn new(matcher: UrlMatcher) -> Self {
        Self {
            current: RwLock::new(Arc::new(matcher)),
        }
    }

    pub fn current(&self) -> Arc<UrlMatcher> {
        Arc::clone(&self.current.read())
    }

    /// Install `matcher` and return the one it replaces.
    pub fn swap(&self, matcher: UrlMatcher) -> Arc<UrlMatcher> {
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(matcher));
        info!("matcher replaced");
        previous
    }

    pub fn matches(&self, resource_url: &str, page_url: &str) -> bool {
        self.current().matches(resource_url, page_url)
    }
}
