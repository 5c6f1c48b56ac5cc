use thiserror::Error;

/// Tracking matcher error types.
///
/// Every variant is a construction-time failure. Queries never error; they
/// degrade to "not blocked" or "not whitelisted" instead.
#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Empty key cannot be inserted into a trie")]
    EmptyKey,

    #[error("Invalid host in list '{list}' at line {line}: {host:?}")]
    InvalidHost {
        list: String,
        line: usize,
        host: String,
    },

    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),

    #[error("Too many categories: {count} (maximum {max})")]
    TooManyCategories { count: usize, max: usize },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Config error: {0}")]
    ConfigError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MatcherError>;
