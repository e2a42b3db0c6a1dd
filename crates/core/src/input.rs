//! Input classification.
//!
//! Turns the raw positional argument into an [`InputSpec`]: a URL, a local
//! file path or standard input. Classification never touches the network or
//! the filesystem, so a token that is neither clearly a URL nor stdin falls
//! back to a file path and fails later with a "file not found" error.
//!
//! # Example
//!
//! ```rust
//! use plucker_core::{InputKind, classify};
//!
//! assert_eq!(classify("https://example.com").kind, InputKind::Url);
//! assert_eq!(classify("example.com").normalized, "https://example.com/");
//! assert_eq!(classify("index.html").kind, InputKind::FilePath);
//! assert_eq!(classify("-").kind, InputKind::Stdin);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::detect::MARKDOWN_EXTENSIONS;

/// Extensions of documents that are usually local files, never top-level domains.
/// Country codes that double as common domains, such as `rs` and `sh`, stay out.
const LOCAL_DOCUMENT_EXTENSIONS: &[&str] = &[
    "html", "htm", "xhtml", "xml", "txt", "json", "toml", "yaml", "yml", "csv", "tsv", "log", "ini", "cfg", "conf",
    "lock", "py", "js", "ts", "css", "pdf", "png", "jpg", "jpeg", "gif", "svg",
];

/// Where the content for a run comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Url,
    FilePath,
    Stdin,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Url => write!(f, "url"),
            InputKind::FilePath => write!(f, "file"),
            InputKind::Stdin => write!(f, "stdin"),
        }
    }
}

/// A classified input argument.
///
/// `normalized` is an absolute `http(s)` URL for [`InputKind::Url`], an
/// absolute path for [`InputKind::FilePath`] and `"-"` for [`InputKind::Stdin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSpec {
    pub raw: String,
    pub kind: InputKind,
    pub normalized: String,
}

impl InputSpec {
    /// The normalized value as a path, for file inputs.
    pub fn path(&self) -> Option<&Path> {
        match self.kind {
            InputKind::FilePath => Some(Path::new(&self.normalized)),
            _ => None,
        }
    }

    /// The normalized value as a parsed URL, for URL inputs.
    pub fn url(&self) -> Option<Url> {
        match self.kind {
            InputKind::Url => Url::parse(&self.normalized).ok(),
            _ => None,
        }
    }
}

/// Classifies a raw input argument.
///
/// Empty input and `"-"` read from stdin. Anything with an `http://` or
/// `https://` scheme, or a bare domain-like token such as `example.com/docs`,
/// is a URL. Everything else is a file path.
///
/// Classification never touches the filesystem, so a bare `name.ext` token is
/// a file only when `ext` is a known document or source extension (`html`,
/// `md`, `json`, `toml`, `py` and the like). Other dotted names such as
/// `notes.app` read as domains; prefix them with `./` to force a file path.
pub fn classify(raw: &str) -> InputSpec {
    let trimmed = raw.trim();

    let (kind, normalized) = if trimmed.is_empty() || trimmed == "-" {
        (InputKind::Stdin, "-".to_string())
    } else if let Some(url) = as_url(trimmed) {
        (InputKind::Url, url)
    } else {
        (InputKind::FilePath, absolute_path(trimmed))
    };

    debug!(raw, %kind, normalized = %normalized, "classified input");

    InputSpec { raw: raw.to_string(), kind, normalized }
}

/// Classifies an optional argument, treating `None` as stdin.
pub fn classify_opt(raw: Option<&str>) -> InputSpec {
    classify(raw.unwrap_or_default())
}

fn as_url(token: &str) -> Option<String> {
    let lower = token.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        token.to_string()
    } else if looks_like_domain(token) {
        format!("https://{}", token)
    } else {
        return None;
    };

    Url::parse(&candidate)
        .ok()
        .filter(|url| url.host_str().is_some())
        .map(String::from)
}

/// A bare token is domain-like when its host part has dotted alphanumeric
/// labels ending in an alphabetic label that is not a local document extension.
fn looks_like_domain(token: &str) -> bool {
    if token.starts_with(['/', '.', '~'])
        || token.contains('\\')
        || token.contains(char::is_whitespace)
    {
        return false;
    }

    let host = token.split('/').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    if !host.contains('.') {
        return false;
    }

    let labels: Vec<&str> = host.split('.').collect();
    let well_formed = labels
        .iter()
        .all(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    if !well_formed {
        return false;
    }

    let tld = labels.last().copied().unwrap_or_default().to_ascii_lowercase();
    tld.chars().all(|c| c.is_ascii_alphabetic())
        && !LOCAL_DOCUMENT_EXTENSIONS.contains(&tld.as_str())
        && !MARKDOWN_EXTENSIONS.contains(&tld.as_str())
}

fn absolute_path(token: &str) -> String {
    let path = PathBuf::from(token);
    std::path::absolute(&path)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
