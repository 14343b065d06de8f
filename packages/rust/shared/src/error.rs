//! Error types for adpt.
//!
//! Library crates use [`AdptError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all adpt operations.
#[derive(Debug, thiserror::Error)]
pub enum AdptError {
    /// A configuration source did not yield a JSON object.
    #[error("unsupported configuration source: expected a JSON object, found {found}")]
    UnsupportedSourceKind { found: String },

    /// Schema validation failed. Carries every violation, not just the first.
    #[error("invalid configuration ({} violation(s)): {}", violations.len(), violations.join("; "))]
    InvalidConfiguration { violations: Vec<String> },

    /// The document title is empty or whitespace-only.
    #[error("the title can't be empty")]
    EmptyTitle,

    /// The authors list contains the same author more than once.
    #[error("the authors list must not contain duplicates")]
    DuplicateAuthors,

    /// Two chapters share the same slug.
    #[error("chapter id '{slug}' is already in use (ids are lowercase titles with spaces replaced by hyphens)")]
    DuplicateChapterSlug { slug: String },

    /// An author could not be built from the given fields or text.
    #[error("invalid author: {message}")]
    InvalidAuthor { message: String },

    /// Network/HTTP error while fetching the schema or the locale bundle.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON/TOML parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Application configuration loading error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Any other invariant or precondition violation.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AdptError>;

impl AdptError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an author error from any displayable message.
    pub fn invalid_author(msg: impl Into<String>) -> Self {
        Self::InvalidAuthor {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Schema violations carried by an [`AdptError::InvalidConfiguration`].
    ///
    /// Empty for every other kind.
    pub fn violations(&self) -> &[String] {
        match self {
            Self::InvalidConfiguration { violations } => violations,
            _ => &[],
        }
    }
}
