//! Fetch a web page, file, or stdin and reduce it to its main content as Markdown.
//!
//! The pipeline is: [`classify`] the input, [`resolve`] a [`FetchPlan`],
//! fetch, detect Markdown pass-through, then [`extract`] the main content and
//! [`serialize`] it. [`Converter`] and [`fetch_and_convert`] wire the steps
//! together.

pub mod convert;
pub mod detect;
pub mod error;
pub mod extract;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod formatters;
pub mod input;
pub mod parse;
pub mod plan;
#[cfg(feature = "render")]
pub mod render;
pub mod rules;

#[cfg(feature = "fetch")]
pub use convert::fetch_and_convert;
pub use convert::{ConvertConfig, ConvertConfigBuilder, Converter, FetchedContent, MarkdownOutput};
pub use detect::{MARKDOWN_EXTENSIONS, is_markdown, is_markdown_content_type, is_markdown_path, is_markdown_url};
pub use error::{PluckerError, Result};
pub use extract::{extract, remove_boilerplate, select_candidate};
#[cfg(feature = "fetch")]
pub use fetch::{FetchedBody, execute, fetch_file, fetch_stdin, fetch_url};
pub use formatters::{
    BulletStyle, CodeBlockStyle, DEFAULT_LINK_MAX_LENGTH, HeadingStyle, MarkdownFormatter, SerializationOptions,
    TRUNCATION_MARKER, html_to_markdown, normalize_blank_lines, serialize, truncate_links,
};
pub use input::{InputKind, InputSpec, classify, classify_opt};
pub use parse::{Document, Element};
pub use plan::{
    DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT, FetchFlags, FetchMechanism, FetchPlan, WaitUntil, resolve,
};
pub use rules::{CandidateSelector, ExtractionPolicy, RULES_VERSION, RemovalRule};
