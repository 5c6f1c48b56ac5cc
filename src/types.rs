use std::fmt;
use std::sync::Arc;

use url::Url;

/// Hostname with its labels in reverse order.
///
/// `a.b.example.com` becomes `com.example.b.a`, so ancestor domains turn into
/// dot-bounded prefixes and can be matched on an ordinary character trie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostKey(String);

impl HostKey {
    /// Build a key from a raw hostname.
    ///
    /// The host is ASCII-lowercased and a trailing root dot is dropped
    /// (`Example.COM.` and `example.com` produce the same key).
    pub fn from_host(host: &str) -> Self {
        let host = host.strip_suffix('.').unwrap_or(host);
        let mut key = String::with_capacity(host.len());
        for (i, label) in host.rsplit('.').enumerate() {
            if i > 0 {
                key.push('.');
            }
            key.push_str(label);
        }
        key.make_ascii_lowercase();
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for HostKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File extensions served as web fonts
pub const WEB_FONT_EXTENSIONS: [&str; 5] = ["woff", "woff2", "eot", "ttf", "otf"];

/// Lowercase `host` and drop a trailing root dot, the same normalization
/// [`HostKey::from_host`] applies.
pub(crate) fn normalize_host(host: &str) -> String {
    host.strip_suffix('.').unwrap_or(host).to_ascii_lowercase()
}

/// Extract the normalized host of a URL.
///
/// Returns `None` for strings that do not parse as a URL and for URLs
/// without a host, such as `data:` and `about:blank`.
pub fn host_from_url(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    url_host(&url)
}

/// Normalized host of a resource URL and whether its path names a web font.
pub(crate) fn resource_from_url(input: &str) -> Option<(String, bool)> {
    let url = Url::parse(input.trim()).ok()?;
    let host = url_host(&url)?;
    Some((host, is_web_font_path(url.path())))
}

fn url_host(url: &Url) -> Option<String> {
    let host = normalize_host(url.host_str()?);
    if host.is_empty() {
        return None;
    }
    Some(host)
}

/// Whether the last path segment ends in one of [`WEB_FONT_EXTENSIONS`].
pub fn is_web_font_path(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((_, ext)) => WEB_FONT_EXTENSIONS
            .iter()
            .any(|font| font.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Outcome of a single blocking decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No enabled category lists the resource host
    Allowed,
    /// Listed by `category` and not exempted for this page
    Blocked { category: Arc<str> },
    /// Listed by `category`, but the page's entity list allows it
    WhiteListed { category: Arc<str> },
}

impl Verdict {
    /// Whether the resource load should be cancelled
    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Blocked { .. })
    }

    /// Category that listed the resource, if any
    pub fn category(&self) -> Option<&str> {
        match self {
            Verdict::Allowed => None,
            Verdict::Blocked { category } | Verdict::WhiteListed { category } => Some(&**category),
        }
    }
}

/// Cache key for the decision cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pub resource_host: String,
    pub page_host: Option<String>,
    /// Resource path names a web font
    pub web_font: bool,
    /// Bitmask of the categories enabled when the verdict was computed
    pub signature: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_key_reverses_labels() {
        assert_eq!(
            HostKey::from_host("a.b.example.com").as_str(),
            "com.example.b.a"
        );
        assert_eq!(HostKey::from_host("example.com").as_str(), "com.example");
        assert_eq!(HostKey::from_host("localhost").as_str(), "localhost");
    }

    #[test]
    fn test_host_key_normalizes_case_and_root_dot() {
        assert_eq!(
            HostKey::from_host("WWW.Example.COM."),
            HostKey::from_host("www.example.com")
        );
    }

    #[test]
    fn test_host_key_empty() {
        let key = HostKey::from_host("");
        assert!(key.is_empty());
        assert!(!HostKey::from_host("a.b.c").is_empty());
    }

    #[test]
    fn test_host_from_url() {
        assert_eq!(
            host_from_url("http://Tracker.Example/px.gif").as_deref(),
            Some("tracker.example")
        );
        assert_eq!(
            host_from_url("https://mozilla.org/another/page.html?u=a").as_deref(),
            Some("mozilla.org")
        );
    }

    #[test]
    fn test_host_from_url_drops_root_dot() {
        assert_eq!(
            host_from_url("http://TrackerSimulator.org./a.js").as_deref(),
            Some("trackersimulator.org")
        );
        assert_eq!(normalize_host("Example.COM."), "example.com");
    }

    #[test]
    fn test_web_font_paths() {
        assert!(is_web_font_path("/fonts/OpenSans.woff2"));
        assert!(is_web_font_path("/a/b/icons.TTF"));
        assert!(is_web_font_path("/legacy.eot"));
        assert!(!is_web_font_path("/fonts/"));
        assert!(!is_web_font_path("/app.js"));
        assert!(!is_web_font_path("/woff"));
        assert!(!is_web_font_path("/font.woff/index.html"));
    }

    #[test]
    fn test_resource_from_url() {
        assert_eq!(
            resource_from_url("https://Fonts.Example./f/Inter.woff2?v=3"),
            Some(("fonts.example".to_string(), true))
        );
        assert_eq!(
            resource_from_url("https://cdn.example/app.js"),
            Some(("cdn.example".to_string(), false))
        );
        assert_eq!(resource_from_url("data:font/woff2;base64,AAAA"), None);
    }

    #[test]
    fn test_host_from_url_without_host() {
        assert!(host_from_url("data:text/html;stuff here").is_none());
        assert!(host_from_url("about:blank").is_none());
        assert!(host_from_url("not a url").is_none());
        assert!(host_from_url("").is_none());
    }

    #[test]
    fn test_verdict_accessors() {
        let blocked = Verdict::Blocked {
            category: Arc::from("ads"),
        };
        assert!(blocked.is_blocked());
        assert_eq!(blocked.category(), Some("ads"));

        let exempt = Verdict::WhiteListed {
            category: Arc::from("social"),
        };
        assert!(!exempt.is_blocked());
        assert_eq!(exempt.category(), Some("social"));

        assert!(!Verdict::Allowed.is_blocked());
        assert_eq!(Verdict::Allowed.category(), None);
    }
}
