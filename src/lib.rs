//! Tracking Matcher - content-blocking decisions for a browser engine
//!
//! This library decides, for every sub-resource a page loads, whether the
//! resource host belongs to a known tracker list and should be blocked:
//! - Domain-suffix tries over reversed host labels
//! - Independently toggleable categories (ads, analytics, social, content)
//! - Optional web-font blocking keyed on the resource file extension
//! - Per-site entity lists that exempt a first party's own third parties
//! - LRU caching of verdicts, invalidated on every category toggle
//!
//! # Example
//!
//! ```rust
//! use tracking_matcher::{
//!     compile_category_trie, compile_entity_list, DefaultCategory, EntityEntry,
//!     MemorySettings, UrlMatcher,
//! };
//!
//! let ads = compile_category_trie("Advertising", &["tracker.example", "ads.cdn.example"]).unwrap();
//! let entities = compile_entity_list(&[EntityEntry::new("Example News")
//!     .with_properties(&["news.example"])
//!     .with_resources(&["ads.cdn.example"])])
//! .unwrap();
//!
//! let settings = MemorySettings::new();
//! let matcher = UrlMatcher::builder()
//!     .default_category(DefaultCategory::Advertising, ads)
//!     .entity_list(entities)
//!     .build(&settings)
//!     .unwrap();
//!
//! assert!(matcher.matches("http://tracker.example/px.gif", "http://news.example"));
//! // Exempted by the entity list
//! assert!(!matcher.matches("http://ads.cdn.example/a.js", "http://news.example"));
//!
//! // Turning the category off takes effect on the next query
//! settings.set_boolean(DefaultCategory::Advertising.pref_key(), false);
//! matcher.on_setting_changed(DefaultCategory::Advertising.pref_key(), &settings);
//! assert!(!matcher.matches("http://tracker.example/px.gif", "http://news.example"));
//! ```
//!
//! # Matching rules
//!
//! | Stored host | Matches | Does not match |
//! |-------------|---------|----------------|
//! | `example.com` | `example.com`, `a.b.example.com` | `otherexample.com`, `com` |
//! | `foo.com` | `bar.foo.com` | `bar-foo.com`, `oo.com` |
//!
//! Resources without a host (`data:`, `about:blank`) are never blocked; pages
//! without a host never receive entity-list exemptions.

pub mod category;
pub mod compile;
pub mod entity;
pub mod error;
pub mod settings;
pub mod trie;
pub mod types;
pub mod url_matcher;

// Re-export commonly used items
pub use category::{Category, DefaultCategory, WEB_FONTS_CATEGORY, WEB_FONTS_PREF_KEY};
pub use compile::{compile_category_trie, compile_entity_list, EntityEntry};
pub use entity::EntityList;
pub use error::{MatcherError, Result};
pub use settings::{MatcherConfig, MemorySettings, SettingsStore, DEFAULT_CACHE_SIZE};
pub use trie::{NodeId, NodeRef, TerminalKind, Trie, WhiteListTrie};
pub use types::{host_from_url, is_web_font_path, HostKey, Verdict, WEB_FONT_EXTENSIONS};
pub use url_matcher::{MatcherHandle, UrlMatcher, UrlMatcherBuilder, MAX_CATEGORIES};
