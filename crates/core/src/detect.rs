//! Markdown pass-through detection.
//!
//! Decides whether fetched text is already Markdown, in which case extraction
//! and serialization are skipped and the text is emitted unchanged.

use std::path::Path;

use tracing::debug;
use url::Url;

use crate::input::{InputKind, InputSpec};

/// File extensions recognized as Markdown, lowercase and without the dot.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkdn", "mkd", "mdwn", "mdtxt", "mdtext", "rmd"];

/// Media types recognized as Markdown.
const MARKDOWN_MEDIA_TYPES: &[&str] = &["text/markdown", "text/x-markdown", "application/markdown"];

/// Returns true if the path ends in a Markdown extension (case-insensitive).
pub fn is_markdown_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Returns true if a Content-Type header names a Markdown media type.
///
/// Parameters such as `charset` are ignored and the comparison is
/// case-insensitive.
pub fn is_markdown_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };

    let media_type = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    MARKDOWN_MEDIA_TYPES.contains(&media_type.as_str())
}

/// Returns true if the URL's path ends in a Markdown extension.
pub fn is_markdown_url(url: &Url) -> bool {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|segment| is_markdown_path(segment))
        .unwrap_or(false)
}

/// Decides whether content for this input is already Markdown.
///
/// File inputs are judged by extension. URL inputs by the declared
/// Content-Type, or by a Markdown extension on the URL path. Stdin has no
/// extension, so only a declared Content-Type counts.
pub fn is_markdown(spec: &InputSpec, declared_content_type: Option<&str>) -> bool {
    let markdown = match spec.kind {
        InputKind::FilePath => is_markdown_path(&spec.normalized),
        InputKind::Url => {
            is_markdown_content_type(declared_content_type) || spec.url().is_some_and(|url| is_markdown_url(&url))
        }
        InputKind::Stdin => is_markdown_content_type(declared_content_type),
    };

    debug!(kind = %spec.kind, content_type = ?declared_content_type, markdown, "pass-through check");
    markdown
}
