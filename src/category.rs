use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::trie::Trie;
use crate::types::HostKey;

/// Name of the web-font category added by
/// [`UrlMatcherBuilder::web_fonts`](crate::UrlMatcherBuilder::web_fonts)
pub const WEB_FONTS_CATEGORY: &str = "WebFonts";

/// Settings key for web-font blocking; off unless the user opts in
pub const WEB_FONTS_PREF_KEY: &str = "pref_key_performance_block_webfonts";

/// The standard blocklist groups and their settings keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultCategory {
    Advertising,
    Analytics,
    Social,
    /// Trackers embedded in other content; off unless the user opts in
    Content,
}

impl DefaultCategory {
    pub const ALL: [DefaultCategory; 4] = [
        DefaultCategory::Advertising,
        DefaultCategory::Analytics,
        DefaultCategory::Social,
        DefaultCategory::Content,
    ];

    /// Category name as used by the blocklist files
    pub fn name(&self) -> &'static str {
        match self {
            DefaultCategory::Advertising => "Advertising",
            DefaultCategory::Analytics => "Analytics",
            DefaultCategory::Social => "Social",
            DefaultCategory::Content => "Content",
        }
    }

    pub fn pref_key(&self) -> &'static str {
        match self {
            DefaultCategory::Advertising => "pref_privacy_block_ads",
            DefaultCategory::Analytics => "pref_privacy_block_analytics",
            DefaultCategory::Social => "pref_privacy_block_social",
            DefaultCategory::Content => "pref_privacy_block_other",
        }
    }

    pub fn default_enabled(&self) -> bool {
        !matches!(self, DefaultCategory::Content)
    }
}

/// What a category matches on
#[derive(Debug)]
pub(crate) enum CategoryRule {
    /// Resource host or one of its ancestor domains is listed
    Hosts(Trie),
    /// Resource path ends in a web-font extension, whatever the host
    WebFonts,
}

/// A named blocklist with a runtime on/off switch.
///
/// The rule is fixed after construction; only the flag changes.
#[derive(Debug)]
pub struct Category {
    name: Arc<str>,
    pref_key: String,
    default_enabled: bool,
    rule: CategoryRule,
    enabled: AtomicBool,
    /// Bit this category occupies in the cache signature
    bit: u64,
}

impl Category {
    pub(crate) fn new(
        name: Arc<str>,
        pref_key: String,
        default_enabled: bool,
        rule: CategoryRule,
        enabled: bool,
        index: usize,
    ) -> Self {
        Self {
            name,
            pref_key,
            default_enabled,
            rule,
            enabled: AtomicBool::new(enabled),
            bit: 1u64 << index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pref_key(&self) -> &str {
        &self.pref_key
    }

    pub fn default_enabled(&self) -> bool {
        self.default_enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Returns true if the flag actually changed.
    pub(crate) fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::AcqRel) != enabled
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub(crate) fn bit(&self) -> u64 {
        self.bit
    }

    /// Host-list categories are subject to first-party and entity-list
    /// exemptions; web fonts are not.
    pub(crate) fn is_host_list(&self) -> bool {
        matches!(self.rule, CategoryRule::Hosts(_))
    }

    /// Whether a load of `host` (a web font if `web_font`) falls in this
    /// category. Ignores the enabled flag.
    pub fn covers(&self, host: &HostKey, web_font: bool) -> bool {
        match &self.rule {
            CategoryRule::Hosts(trie) => trie.find_node(host).is_some(),
            CategoryRule::WebFonts => web_font,
        }
    }
}
