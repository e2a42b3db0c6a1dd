//! End-to-end conversion.
//!
//! [`Converter`] runs the synchronous part of the pipeline on content that has
//! already been fetched: pass-through for Markdown, otherwise parse, extract
//! and serialize. [`fetch_and_convert`] adds plan resolution and fetching in
//! front of it.
//!
//! # Example
//!
//! ```rust
//! use plucker_core::Converter;
//!
//! let html = "<html><body><nav>Menu</nav><main><h1>Title</h1><p>Body text.</p></main></body></html>";
//! let output = Converter::new().convert_html(html).unwrap();
//! assert!(output.text.contains("# Title\n\nBody text."));
//! assert!(!output.text.contains("Menu"));
//! ```

use tracing::{debug, info};

use crate::detect::is_markdown;
use crate::extract::extract;
use crate::formatters::{MarkdownFormatter, SerializationOptions};
use crate::input::{InputKind, InputSpec};
use crate::parse::Document;
use crate::rules::ExtractionPolicy;
use crate::Result;

/// Fetched text together with the pass-through decision made for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedContent {
    pub text: String,
    /// Decided once, when the content is fetched.
    pub is_markdown: bool,
    pub origin_kind: InputKind,
}

impl FetchedContent {
    /// Wraps fetched text, running the Markdown detector on it.
    pub fn detect(spec: &InputSpec, text: String, content_type: Option<&str>) -> Self {
        let is_markdown = is_markdown(spec, content_type);
        Self { text, is_markdown, origin_kind: spec.kind }
    }

    /// Wraps text known to be HTML.
    pub fn html(text: impl Into<String>, origin_kind: InputKind) -> Self {
        Self { text: text.into(), is_markdown: false, origin_kind }
    }
}

/// The final Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOutput {
    pub text: String,
}

/// Configuration for a conversion.
///
/// # Example
///
/// ```rust
/// use plucker_core::ConvertConfig;
///
/// let config = ConvertConfig::builder()
///     .selector("#content")
///     .link_max_length(80)
///     .build();
/// assert_eq!(config.serialization.link_max_length, 80);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConvertConfig {
    pub policy: ExtractionPolicy,
    pub serialization: SerializationOptions,
    /// CSS selector that replaces automatic main-content selection.
    pub selector: Option<String>,
}

impl ConvertConfig {
    /// Creates a new builder for ConvertConfig.
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder::new()
    }
}

/// Builder for ConvertConfig.
pub struct ConvertConfigBuilder {
    config: ConvertConfig,
}

impl ConvertConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ConvertConfig::default() }
    }

    /// Replaces the extraction rule table.
    pub fn policy(mut self, policy: ExtractionPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Replaces all serialization options.
    pub fn serialization(mut self, options: SerializationOptions) -> Self {
        self.config.serialization = options;
        self
    }

    /// Sets the CSS selector for the main content.
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.config.selector = Some(selector.into());
        self
    }

    /// Sets the longest link URL kept intact (0 disables truncation).
    pub fn link_max_length(mut self, value: usize) -> Self {
        self.config.serialization.link_max_length = value;
        self
    }

    /// Adds a tag to unwrap before conversion.
    pub fn strip_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.serialization.strip_tags.push(tag.into());
        self
    }

    pub fn build(self) -> ConvertConfig {
        self.config
    }
}

impl Default for ConvertConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts fetched content to Markdown.
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    /// Creates a converter with the default rule table and options.
    pub fn new() -> Self {
        Self { config: ConvertConfig::default() }
    }

    pub fn with_config(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// Converts fetched content.
    ///
    /// Markdown content is returned byte-for-byte; extraction and
    /// serialization are skipped.
    ///
    /// # Errors
    ///
    /// Any extraction or serialization error, see [`crate::extract::extract`].
    pub fn convert(&self, content: &FetchedContent) -> Result<MarkdownOutput> {
        if content.is_markdown {
            info!(origin = %content.origin_kind, "content is already Markdown, passing through");
            return Ok(MarkdownOutput { text: content.text.clone() });
        }

        self.convert_html(&content.text)
    }

    /// Extracts the main content of an HTML document and serializes it.
    pub fn convert_html(&self, html: &str) -> Result<MarkdownOutput> {
        let mut doc = Document::parse(html)?;
        let node = extract(&mut doc, &self.config.policy, self.config.selector.as_deref())?;
        debug!(tag = %node.tag_name(), "serializing");

        let text = MarkdownFormatter::new(self.config.serialization.clone()).format(&node)?;
        Ok(MarkdownOutput { text })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a plan for `spec`, fetches, and converts.
///
/// For URL inputs without an explicit base URL, relative links are resolved
/// against the input URL.
///
/// # Example
///
/// ```no_run
/// use plucker_core::{ConvertConfig, FetchFlags, classify, fetch_and_convert};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let spec = classify("example.com");
///     let output = fetch_and_convert(&spec, &FetchFlags::default(), ConvertConfig::default()).await?;
///     println!("{}", output.text);
///     Ok(())
/// }
/// ```
#[cfg(feature = "fetch")]
pub async fn fetch_and_convert(
    spec: &InputSpec, flags: &crate::plan::FetchFlags, mut config: ConvertConfig,
) -> Result<MarkdownOutput> {
    let plan = crate::plan::resolve(spec, flags);
    let body = crate::fetch::execute(&plan).await?;
    let content = FetchedContent::detect(spec, body.text, body.content_type.as_deref());

    if config.serialization.base_url.is_none() {
        config.serialization.base_url = spec.url();
    }

    Converter::with_config(config).convert(&content)
}
