//! Main content extraction.
//!
//! Extraction runs in two passes over one [`Document`]:
//!
//! 1. Every node matching a removal rule is detached, document-wide. This runs
//!    first so boilerplate nested inside the eventual main region (a `<nav>`
//!    inside `<main>`, for example) is already gone.
//! 2. The first element matching the policy's candidate list is selected, in
//!    priority order, falling back to `<body>` and then the root element.
//!
//! A caller-supplied CSS selector replaces step 2. It is matched against the
//! document as it was before removal, and the first match that survived
//! removal is returned.
//!
//! # Example
//!
//! ```rust
//! use plucker_core::{Document, ExtractionPolicy, extract};
//!
//! let html = "<html><body><nav>Menu</nav><main><h1>Title</h1></main></body></html>";
//! let mut doc = Document::parse(html).unwrap();
//! let node = extract(&mut doc, &ExtractionPolicy::default(), None).unwrap();
//! assert_eq!(node.tag_name(), "main");
//! assert!(!doc.text_content().contains("Menu"));
//! ```

use ego_tree::NodeId;
use scraper::Node;
use tracing::{debug, info};

use crate::parse::{Document, Element, parse_selector};
use crate::rules::ExtractionPolicy;
use crate::{PluckerError, Result};

/// Removes boilerplate and selects the main content element.
///
/// # Errors
///
/// - [`PluckerError::HtmlParseError`] if `selector` is not valid CSS.
/// - [`PluckerError::SelectorNotFound`] if `selector` matches nothing.
/// - [`PluckerError::SelectorRemoved`] if every match was removed as boilerplate.
pub fn extract<'a>(doc: &'a mut Document, policy: &ExtractionPolicy, selector: Option<&str>) -> Result<Element<'a>> {
    let selected = match selector {
        Some(selector) => {
            let matched = match_original(doc, selector)?;
            remove_boilerplate(doc, policy);
            first_attached(doc, &matched, selector)?
        }
        None => {
            remove_boilerplate(doc, policy);
            select_candidate(doc, policy)
        }
    };

    let doc: &'a Document = doc;
    doc.element(selected)
        .ok_or_else(|| PluckerError::Extraction("selected node is not an element".to_string()))
}

/// Detaches every node matched by the policy's removal rules.
///
/// Returns the number of nodes detached.
pub fn remove_boilerplate(doc: &mut Document, policy: &ExtractionPolicy) -> usize {
    let removes_comments = policy.removes_comments();

    let doomed: Vec<NodeId> = doc
        .html()
        .tree
        .root()
        .descendants()
        .filter(|node| match node.value() {
            Node::Comment(_) => removes_comments,
            Node::Element(element) => policy.is_boilerplate(element),
            _ => false,
        })
        .map(|node| node.id())
        .collect();

    let removed = doc.detach_all(&doomed);
    debug!(removed, "removed boilerplate nodes");
    removed
}

/// Picks the main content element of an already-cleaned document.
///
/// Candidates are tried in the policy's order, each scanning the document in
/// tree order; the first hit wins. Without a hit the body is returned, or the
/// root element when there is no body.
pub fn select_candidate(doc: &Document, policy: &ExtractionPolicy) -> NodeId {
    let root = doc.root();

    for (rank, candidate) in policy.candidates.iter().enumerate() {
        let hit = doc
            .html()
            .tree
            .root()
            .descendants()
            .find(|node| node.value().as_element().is_some_and(|element| candidate.matches(element)));

        if let Some(node) = hit {
            info!(rank, ?candidate, "selected main content");
            return node.id();
        }
    }

    match doc.body() {
        Some(body) => {
            info!("no content candidate matched, falling back to <body>");
            body.id()
        }
        None => {
            info!("no content candidate or <body>, falling back to document root");
            root.id()
        }
    }
}

fn match_original(doc: &Document, selector: &str) -> Result<Vec<NodeId>> {
    let sel = parse_selector(selector)?;
    let matched: Vec<NodeId> = doc.html().select(&sel).map(|el| el.id()).collect();

    if matched.is_empty() {
        return Err(PluckerError::SelectorNotFound(selector.to_string()));
    }
    Ok(matched)
}

fn first_attached(doc: &Document, matched: &[NodeId], selector: &str) -> Result<NodeId> {
    match matched.iter().copied().find(|id| doc.is_attached(*id)) {
        Some(id) => {
            info!(selector, "selected main content by selector");
            Ok(id)
        }
        None => Err(PluckerError::SelectorRemoved(selector.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_html(html: &str) -> String {
        let mut doc = Document::parse(html).unwrap();
        extract(&mut doc, &ExtractionPolicy::default(), None).unwrap().outer_html()
    }

    fn extract_tag(html: &str) -> String {
        let mut doc = Document::parse(html).unwrap();
        extract(&mut doc, &ExtractionPolicy::default(), None).unwrap().tag_name()
    }

    #[test]
    fn test_nav_inside_main_is_removed() {
        let html = r#"<html><body><main><nav><a href="/">Home</a></nav><p>Body</p></main></body></html>"#;
        let mut doc = Document::parse(html).unwrap();
        let node = extract(&mut doc, &ExtractionPolicy::default(), None).unwrap();

        assert_eq!(node.tag_name(), "main");
        assert!(node.select("nav").unwrap().is_empty());
        assert!(!node.outer_html().contains("Home"));
        assert!(node.outer_html().contains("Body"));
    }

    #[test]
    fn test_article_beats_content_div() {
        let html = r#"<html><body>
            <div class="content"><p>Div</p></div>
            <article><p>Article</p></article>
        </body></html>"#;
        assert_eq!(extract_tag(html), "article");
    }

    #[test]
    fn test_main_beats_article() {
        let html = "<html><body><article><p>A</p></article><main><p>M</p></main></body></html>";
        assert_eq!(extract_tag(html), "main");
    }

    #[test]
    fn test_role_main_beats_content_div() {
        let html = r#"<html><body><div class="post">P</div><section role="main">R</section></body></html>"#;
        assert_eq!(extract_tag(html), "section");
    }

    #[test]
    fn test_content_div_selected() {
        let html = r#"<html><body><div class="wrapper"><div class="Post-Body"><p>Text</p></div></div></body></html>"#;
        let out = extract_html(html);
        assert!(out.starts_with(r#"<div class="Post-Body">"#));
    }

    #[test]
    fn test_content_class_on_span_is_ignored() {
        let html = r#"<html><body><span class="content">S</span><p>Plain</p></body></html>"#;
        assert_eq!(extract_tag(html), "body");
    }

    #[test]
    fn test_fallback_to_body() {
        let html = "<html><body><p>Just a paragraph.</p></body></html>";
        assert_eq!(extract_tag(html), "body");
    }

    #[test]
    fn test_fallback_for_fragment() {
        assert_eq!(extract_tag("plain text, no markup at all"), "body");
    }

    #[test]
    fn test_removed_candidate_is_never_selected() {
        let html = r#"<html><body><main class="sidebar"><p>Side</p></main><article><p>Real</p></article></body></html>"#;
        let out = extract_html(html);
        assert!(out.starts_with("<article>"));
        assert!(!out.contains("Side"));
    }

    #[test]
    fn test_comments_and_scripts_removed() {
        let html = r#"<html><body><main><!-- hidden note --><script>var x = 1;</script><p>Keep</p></main></body></html>"#;
        let out = extract_html(html);
        assert!(!out.contains("hidden note"));
        assert!(!out.contains("var x"));
        assert!(out.contains("Keep"));
    }

    #[test]
    fn test_removal_is_document_wide() {
        let html = r#"<html><head><style>p{}</style></head><body><header>H</header><main>M</main><aside>A</aside></body></html>"#;
        let mut doc = Document::parse(html).unwrap();
        let removed = remove_boilerplate(&mut doc, &ExtractionPolicy::default());

        assert_eq!(removed, 3);
        let text = doc.text_content();
        assert!(text.contains('M'));
        assert!(!text.contains('H'));
        assert!(!text.contains('A'));
    }

    #[test]
    fn test_selector_override() {
        let html = r#"<html><body><main>M</main><div id="target"><p>T</p><nav>N</nav></div></body></html>"#;
        let mut doc = Document::parse(html).unwrap();
        let node = extract(&mut doc, &ExtractionPolicy::default(), Some("#target")).unwrap();

        assert_eq!(node.attr("id"), Some("target"));
        assert!(!node.outer_html().contains("<nav>"));
    }

    #[test]
    fn test_selector_not_found() {
        let mut doc = Document::parse("<html><body><p>x</p></body></html>").unwrap();
        let result = extract(&mut doc, &ExtractionPolicy::default(), Some(".missing"));
        assert!(matches!(result, Err(PluckerError::SelectorNotFound(s)) if s == ".missing"));
    }

    #[test]
    fn test_selector_matching_removed_content() {
        let mut doc = Document::parse("<html><body><nav><ul class='links'>x</ul></nav><p>y</p></body></html>").unwrap();
        let result = extract(&mut doc, &ExtractionPolicy::default(), Some("ul.links"));
        assert!(matches!(result, Err(PluckerError::SelectorRemoved(_))));
    }

    #[test]
    fn test_selector_skips_removed_first_match() {
        let html = r#"<html><body><aside><p class="x">A</p></aside><p class="x">B</p></body></html>"#;
        let mut doc = Document::parse(html).unwrap();
        let node = extract(&mut doc, &ExtractionPolicy::default(), Some("p.x")).unwrap();
        assert_eq!(node.text(), "B");
    }

    #[test]
    fn test_invalid_selector() {
        let mut doc = Document::parse("<html><body><p>x</p></body></html>").unwrap();
        let result = extract(&mut doc, &ExtractionPolicy::default(), Some("[[nope"));
        assert!(matches!(result, Err(PluckerError::HtmlParseError(_))));
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let html = r#"<html><body><nav>N</nav><div class="entry">E</div></body></html>"#;
        assert_eq!(extract_html(html), extract_html(html));
    }
}
