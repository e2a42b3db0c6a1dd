//! HTML parsing and DOM access.
//!
//! This module provides the [`Document`] and [`Element`] types. A `Document`
//! owns the parsed tree and supports detaching nodes, which is how
//! boilerplate removal works; an `Element` is a borrowed view of one node.
//!
//! # Example
//!
//! ```rust
//! use plucker_core::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs[0].text(), "Paragraph");
//! ```

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::{PluckerError, Result};

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides methods for querying elements
/// using CSS selectors and removing nodes in place.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// # Errors
    ///
    /// Returns [`PluckerError::Extraction`] if the input is empty or only
    /// whitespace; there is no document to extract from.
    ///
    /// # Example
    ///
    /// ```rust
    /// use plucker_core::Document;
    ///
    /// let html = "<html><body><h1>Title</h1></body></html>";
    /// let doc = Document::parse(html).unwrap();
    /// assert!(Document::parse("  ").is_err());
    /// ```
    pub fn parse(html: &str) -> Result<Self> {
        if html.trim().is_empty() {
            return Err(PluckerError::Extraction("document is empty".to_string()));
        }

        Ok(Self { html: Html::parse_document(html) })
    }

    /// Gets the raw HTML representation.
    ///
    /// Returns a reference to the underlying `scraper::Html` instance.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The `<html>` element.
    pub fn root(&self) -> Element<'_> {
        Element { element: self.html.root_element() }
    }

    /// The `<body>` element, if the document has one.
    pub fn body(&self) -> Option<Element<'_>> {
        self.root()
            .element
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "body")
            .map(|element| Element { element })
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`PluckerError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use plucker_core::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Looks up an element by node id.
    pub fn element(&self, id: NodeId) -> Option<Element<'_>> {
        self.html
            .tree
            .get(id)
            .and_then(ElementRef::wrap)
            .map(|element| Element { element })
    }

    /// Returns true if the node is still reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let root = self.html.tree.root().id();
        match self.html.tree.get(id) {
            Some(node) => node.id() == root || node.ancestors().any(|ancestor| ancestor.id() == root),
            None => false,
        }
    }

    /// Detaches the nodes from the tree, dropping them from every later
    /// traversal and serialization. Returns how many were detached.
    pub fn detach_all(&mut self, ids: &[NodeId]) -> usize {
        let mut detached = 0;
        for id in ids {
            if let Some(mut node) = self.html.tree.get_mut(*id) {
                node.detach();
                detached += 1;
            }
        }
        detached
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use plucker_core::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// The node id inside the owning document's tree.
    pub fn id(&self) -> NodeId {
        self.element.id()
    }

    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the text content of this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`PluckerError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| PluckerError::HtmlParseError(format!("Invalid selector: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page</title>
        </head>
        <body>
            <h1>Heading</h1>
            <p class="content">Paragraph 1</p>
            <p class="content">Paragraph 2</p>
            <a href="https://example.com">Link</a>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        assert_eq!(doc.root().tag_name(), "html");
        assert_eq!(doc.body().unwrap().tag_name(), "body");
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(matches!(Document::parse(""), Err(PluckerError::Extraction(_))));
        assert!(matches!(Document::parse("\n\t "), Err(PluckerError::Extraction(_))));
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
        assert_eq!(elements[1].text(), "Paragraph 2");
    }

    #[test]
    fn test_element_attributes() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let elements = doc.select("a").unwrap();

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].attr("href"), Some("https://example.com"));
        assert_eq!(elements[0].text(), "Link");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(PluckerError::HtmlParseError(_))));
    }

    #[test]
    fn test_detach_removes_from_output() {
        let mut doc = Document::parse(SAMPLE_HTML).unwrap();
        let ids: Vec<NodeId> = doc.select("p.content").unwrap().iter().map(|el| el.id()).collect();

        assert_eq!(doc.detach_all(&ids), 2);
        assert!(!doc.text_content().contains("Paragraph"));
        assert!(doc.select("p.content").unwrap().is_empty());
        assert!(!ids.iter().any(|id| doc.is_attached(*id)));
        assert!(doc.text_content().contains("Heading"));
    }

    #[test]
    fn test_descendant_of_detached_node_is_not_attached() {
        let mut doc = Document::parse("<html><body><nav><a id='x'>x</a></nav></body></html>").unwrap();
        let nav = doc.select("nav").unwrap()[0].id();
        let link = doc.select("#x").unwrap()[0].id();

        assert!(doc.is_attached(link));
        doc.detach_all(&[nav]);
        assert!(!doc.is_attached(link));
        assert!(doc.element(link).is_some());
    }
}
