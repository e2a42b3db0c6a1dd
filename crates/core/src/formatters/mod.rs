pub mod markdown;

pub use markdown::{
    BulletStyle, CodeBlockStyle, DEFAULT_LINK_MAX_LENGTH, HeadingStyle, MarkdownFormatter, SerializationOptions,
    TRUNCATION_MARKER, html_to_markdown, normalize_blank_lines, serialize, truncate_links,
};
