use std::cell::RefCell;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::Result;
use crate::parse::Element;

/// Default upper bound on link URL length, in characters.
pub const DEFAULT_LINK_MAX_LENGTH: usize = 200;

/// Appended to a truncated URL.
pub const TRUNCATION_MARKER: &str = "…";

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex is valid"));

/// Heading syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// `# Heading`
    #[default]
    Atx,
    /// Underlined with `===` / `---`.
    Setext,
}

/// Unordered list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulletStyle {
    #[default]
    Dash,
    Asterisk,
}

/// Code block syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    /// Triple backtick fences.
    #[default]
    Fenced,
    /// Four-space indentation.
    Indented,
}

impl FromStr for HeadingStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "atx" => Ok(Self::Atx),
            "setext" => Ok(Self::Setext),
            _ => Err(format!("Invalid heading style: {}. Valid options: atx, setext", s)),
        }
    }
}

/// Options for turning the extracted subtree into Markdown.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializationOptions {
    /// Drop any HTML comments left in the subtree
    pub strip_comments: bool,
    pub heading_style: HeadingStyle,
    pub bullet_style: BulletStyle,
    pub code_block_style: CodeBlockStyle,
    /// Longest link URL kept intact; 0 disables truncation
    pub link_max_length: usize,
    /// Tags unwrapped before conversion, keeping their content
    pub strip_tags: Vec<String>,
    /// Base for resolving relative `href`/`src` attributes
    pub base_url: Option<Url>,
}

impl Default for SerializationOptions {
    fn default() -> Self {
        Self {
            strip_comments: true,
            heading_style: HeadingStyle::Atx,
            bullet_style: BulletStyle::Dash,
            code_block_style: CodeBlockStyle::Fenced,
            link_max_length: DEFAULT_LINK_MAX_LENGTH,
            strip_tags: Vec::new(),
            base_url: None,
        }
    }
}

/// Serializes an extracted element to Markdown and applies link truncation.
pub fn serialize(node: &Element<'_>, options: &SerializationOptions) -> Result<String> {
    html_to_markdown(&node.outer_html(), options)
}

/// Converts an HTML fragment to Markdown with the given options.
pub fn html_to_markdown(html: &str, options: &SerializationOptions) -> Result<String> {
    let mut processed = if options.strip_comments { remove_comments(html) } else { html.to_string() };

    if let Some(base_url) = &options.base_url {
        processed = convert_relative_urls(&processed, base_url);
    }

    if !options.strip_tags.is_empty() {
        processed = strip_tags(&processed, &options.strip_tags);
    }

    let markdown = convert(&tag_code_languages(&processed), options)?;
    let markdown = normalize_blank_lines(&markdown);

    Ok(truncate_links(&markdown, options.link_max_length))
}

/// Shortens over-long link and image URLs.
///
/// Any destination longer than `max_length` characters becomes its first
/// `max_length` characters followed by [`TRUNCATION_MARKER`]. Balanced
/// parentheses inside a URL belong to it, as in CommonMark. Link text and
/// titles are left alone. Already-truncated URLs are not touched again, so
/// applying this twice gives the same result as applying it once.
/// A `max_length` of 0 disables truncation.
///
/// # Example
///
/// ```rust
/// use plucker_core::truncate_links;
///
/// let md = "[docs](https://example.com/a/very/long/path)";
/// assert_eq!(truncate_links(md, 19), "[docs](https://example.com…)");
/// assert_eq!(truncate_links(md, 200), md);
/// ```
pub fn truncate_links(text: &str, max_length: usize) -> String {
    if max_length == 0 {
        return text.to_string();
    }

    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    let mut truncated = 0usize;

    while let Some(start) = rest.find("](") {
        let (head, tail) = rest.split_at(start + 2);
        output.push_str(head);

        let (open, url, close) = link_destination(tail, max_length);
        let consumed = open.len() + url.len() + close.len();

        if url.chars().count() > max_length && !is_truncated(url, max_length) {
            truncated += 1;
            output.push_str(open);
            output.extend(url.chars().take(max_length));
            output.push_str(TRUNCATION_MARKER);
            output.push_str(close);
        } else {
            output.push_str(&tail[..consumed]);
        }

        rest = &tail[consumed..];
    }
    output.push_str(rest);

    if truncated > 0 {
        debug!(truncated, max_length, "truncated long link URLs");
    }

    output
}

/// Reads the destination that follows `](`, returned as `(open, url, close)`.
///
/// `<...>` destinations run to the closing `>` on the same line. Bare ones
/// follow CommonMark: parentheses must balance, `\` escapes the next
/// character, and whitespace or an unmatched `)` ends the URL. A URL that
/// already carries the marker at `max_length + 1` characters ends there.
fn link_destination(s: &str, max_length: usize) -> (&'static str, &str, &'static str) {
    if let Some(inner) = s.strip_prefix('<')
        && let Some(end) = inner.find(['>', '\n'])
        && inner[end..].starts_with('>')
    {
        return ("<", &inner[..end], ">");
    }

    let marked_length = max_length + TRUNCATION_MARKER.chars().count();
    let mut depth = 0usize;
    let mut escaped = false;

    for (count, (i, c)) in s.char_indices().enumerate() {
        if escaped {
            escaped = false;
        } else {
            match c {
                '\\' => escaped = true,
                '(' => depth += 1,
                ')' if depth == 0 => return ("", &s[..i], ""),
                ')' => depth -= 1,
                c if c.is_whitespace() => return ("", &s[..i], ""),
                _ => {}
            }
        }

        let end = i + c.len_utf8();
        if count + 1 == marked_length && s[..end].ends_with(TRUNCATION_MARKER) {
            return ("", &s[..end], "");
        }
    }

    ("", s, "")
}

fn is_truncated(url: &str, max_length: usize) -> bool {
    url.ends_with(TRUNCATION_MARKER) && url.chars().count() == max_length + TRUNCATION_MARKER.chars().count()
}

/// Strips trailing whitespace from each line, collapses runs of blank lines to
/// one and ends the text with exactly one newline.
pub fn normalize_blank_lines(markdown: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut prev_empty = false;

    for line in markdown.lines() {
        let line = line.trim_end();
        let is_empty = line.is_empty();
        if is_empty && prev_empty {
            continue;
        }
        lines.push(line);
        prev_empty = is_empty;
    }

    let joined = lines.join("\n");
    let trimmed = joined.trim_matches('\n');
    if trimmed.is_empty() { String::new() } else { format!("{}\n", trimmed) }
}

/// Convert HTML to Markdown using the htmd crate
#[cfg(feature = "markdown")]
fn convert(html: &str, options: &SerializationOptions) -> Result<String> {
    use htmd::HtmlToMarkdown;
    use htmd::options::{BulletListMarker, Options};

    let heading_style = match options.heading_style {
        HeadingStyle::Atx => htmd::options::HeadingStyle::Atx,
        HeadingStyle::Setext => htmd::options::HeadingStyle::Setex,
    };
    let bullet_list_marker = match options.bullet_style {
        BulletStyle::Dash => BulletListMarker::Dash,
        BulletStyle::Asterisk => BulletListMarker::Asterisk,
    };
    let code_block_style = match options.code_block_style {
        CodeBlockStyle::Fenced => htmd::options::CodeBlockStyle::Fenced,
        CodeBlockStyle::Indented => htmd::options::CodeBlockStyle::Indented,
    };

    let converter = HtmlToMarkdown::builder()
        .options(Options { heading_style, bullet_list_marker, code_block_style, ..Default::default() })
        .skip_tags(vec!["script", "style"])
        .build();

    Ok(converter.convert(html)?)
}

/// Fallback HTML to text conversion when markdown feature is disabled
#[cfg(not(feature = "markdown"))]
fn convert(html: &str, _options: &SerializationOptions) -> Result<String> {
    let doc = scraper::Html::parse_document(html);
    Ok(doc.root_element().text().collect::<String>())
}

/// Remove HTML comments from the fragment
fn remove_comments(html: &str) -> String {
    HTML_COMMENT.replace_all(html, "").into_owned()
}

/// Convert relative link and image URLs to absolute URLs
pub fn convert_relative_urls(html: &str, base_url: &Url) -> String {
    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![
                lol_html::element!("a[href]", |el| {
                    if let Some(href) = el.get_attribute("href")
                        && let Ok(absolute) = base_url.join(&href)
                    {
                        el.set_attribute("href", absolute.as_str()).ok();
                    }
                    Ok(())
                }),
                lol_html::element!("img[src]", |el| {
                    if let Some(src) = el.get_attribute("src")
                        && let Ok(absolute) = base_url.join(&src)
                    {
                        el.set_attribute("src", absolute.as_str()).ok();
                    }
                    Ok(())
                }),
            ],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match String::from_utf8(output) {
        Ok(rewritten) if !rewritten.is_empty() => rewritten,
        _ => html.to_string(),
    }
}

/// Unwrap the listed tags, keeping their content
fn strip_tags(html: &str, tags: &[String]) -> String {
    let selectors: Vec<&str> = tags
        .iter()
        .map(|tag| tag.as_str())
        .filter(|tag| is_tag_name(tag))
        .collect();
    if selectors.is_empty() {
        return html.to_string();
    }

    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: selectors
                .into_iter()
                .map(|tag| {
                    lol_html::element!(tag, |el| {
                        el.remove_and_keep_content();
                        Ok(())
                    })
                })
                .collect(),
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    match rewriter.write(html.as_bytes()) {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match rewriter.end() {
        Ok(_) => {}
        Err(_) => return html.to_string(),
    }

    match String::from_utf8(output) {
        Ok(rewritten) if !rewritten.is_empty() => rewritten,
        _ => html.to_string(),
    }
}

/// Gives each `pre > code` block a `language-*` class, taken from a
/// `language-` or `lang-` class on the `code` element or on its `pre`, so the
/// fence carries the language.
fn tag_code_languages(html: &str) -> String {
    let pre_language: RefCell<Option<String>> = RefCell::new(None);
    let mut output = Vec::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![
                lol_html::element!("pre", |el| {
                    *pre_language.borrow_mut() = el.get_attribute("class").as_deref().and_then(code_language);
                    Ok(())
                }),
                lol_html::element!("pre > code", |el| {
                    let language = el
                        .get_attribute("class")
                        .as_deref()
                        .and_then(code_language)
                        .or_else(|| pre_language.borrow().clone());
                    if let Some(language) = language {
                        el.set_attribute("class", &format!("language-{}", language)).ok();
                    }
                    Ok(())
                }),
            ],
            ..Default::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        return html.to_string();
    }

    match String::from_utf8(output) {
        Ok(rewritten) if !rewritten.is_empty() => rewritten,
        _ => html.to_string(),
    }
}

fn code_language(class: &str) -> Option<String> {
    class
        .split_whitespace()
        .find_map(|token| token.strip_prefix("language-").or_else(|| token.strip_prefix("lang-")))
        .filter(|language| !language.is_empty())
        .map(str::to_string)
}

fn is_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Markdown formatter with fixed options
pub struct MarkdownFormatter {
    options: SerializationOptions,
}

impl MarkdownFormatter {
    pub fn new(options: SerializationOptions) -> Self {
        Self { options }
    }

    pub fn format(&self, node: &Element<'_>) -> Result<String> {
        serialize(node, &self.options)
    }
}
