//! Error types for Plucker operations.
//!
//! This module defines the main error type [`PluckerError`] which represents
//! every failure that can end a conversion: fetching, rendering, file I/O,
//! extraction and selector evaluation.
//!
//! # Example
//!
//! ```rust
//! use plucker_core::{PluckerError, Result};
//!
//! fn load(html: &str) -> Result<String> {
//!     if html.trim().is_empty() {
//!         return Err(PluckerError::Extraction("document is empty".to_string()));
//!     }
//!     Ok(html.to_string())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for conversion operations.
///
/// Every variant is terminal for a single conversion. Nothing inside the
/// library retries; the caller decides how to report the failure.
///
/// # Example
///
/// ```rust
/// use plucker_core::{Document, ExtractionPolicy, PluckerError, extract};
///
/// let mut doc = Document::parse("<html><body><p>Hi</p></body></html>").unwrap();
/// match extract(&mut doc, &ExtractionPolicy::default(), Some("#missing")) {
///     Err(PluckerError::SelectorNotFound(selector)) => println!("nothing matched {selector}"),
///     Err(e) => println!("Error: {e}"),
///     Ok(node) => println!("{}", node.outer_html()),
/// }
/// ```
#[derive(Error, Debug)]
pub enum PluckerError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection issues and non-success
    /// status codes.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The fetch or render did not finish within the plan's timeout.
    #[error("Page load timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The headless browser failed to launch, navigate or serialize the page.
    #[error("Browser rendering failed: {0}")]
    Render(String),

    /// A plan asked for JavaScript rendering but the `render` feature is off.
    #[error("JavaScript rendering is not available in this build (use --no-js)")]
    RenderUnavailable,

    /// HTML or CSS selector parsing errors.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The document is empty or could not be turned into a tree.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// A user-supplied selector matched nothing in the document.
    #[error("Selector '{0}' not found in page")]
    SelectorNotFound(String),

    /// A user-supplied selector only matched content removed as boilerplate.
    #[error("Selector '{0}' only matched content that was removed as boilerplate")]
    SelectorRemoved(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Read/write errors on files and standard streams.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for PluckerError.
pub type Result<T> = std::result::Result<T, PluckerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PluckerError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_timeout_error() {
        let err = PluckerError::Timeout { timeout_ms: 30000 };
        assert_eq!(err.to_string(), "Page load timed out after 30000ms");
    }

    #[test]
    fn test_selector_errors_name_the_selector() {
        let missing = PluckerError::SelectorNotFound(".post-body".to_string());
        let removed = PluckerError::SelectorRemoved("nav.menu".to_string());
        assert!(missing.to_string().contains(".post-body"));
        assert!(removed.to_string().contains("nav.menu"));
        assert!(removed.to_string().contains("boilerplate"));
    }

    #[test]
    fn test_file_not_found_shows_path() {
        let err = PluckerError::FileNotFound(PathBuf::from("/tmp/nope.html"));
        assert!(err.to_string().contains("/tmp/nope.html"));
    }
}
