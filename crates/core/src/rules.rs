//! Boilerplate removal and main-content selection rules.
//!
//! The heuristics are plain data: a table of removal rules and an ordered list
//! of candidate selectors. [`ExtractionPolicy`] bundles both and is consumed by
//! [`crate::extract::extract`], which owns all tree traversal.

use scraper::node::Element as ElementData;

/// Version of the default rule table. Bump when a default rule changes.
pub const RULES_VERSION: u32 = 2;

/// Elements removed wherever they appear.
pub const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "nav", "aside", "header", "footer",
];

/// Substrings that mark a class or role as navigation chrome.
pub const NAVIGATION_KEYWORDS: &[&str] = &[
    "sidebar",
    "navigation",
    "nav-",
    "menu",
    "side-bar",
    "sidenav",
    "side-nav",
    "table-of-contents",
];

/// ARIA roles removed on exact match.
pub const BOILERPLATE_ROLES: &[&str] = &["complementary"];

/// Substrings that mark a `div` class as a content container.
pub const CONTENT_CLASS_KEYWORDS: &[&str] = &["content", "article", "post", "entry", "main"];

/// Document skeleton elements that no rule may remove.
const STRUCTURAL_TAGS: &[&str] = &["html", "head", "body"];

/// A predicate deciding whether a node is boilerplate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalRule {
    /// Tag name is in the list.
    Tag(&'static [&'static str]),
    /// The node is an HTML comment.
    Comment,
    /// Any class contains one of the keywords, case-insensitive.
    ClassKeyword(&'static [&'static str]),
    /// The `role` attribute contains one of the keywords, case-insensitive.
    RoleKeyword(&'static [&'static str]),
    /// The `role` attribute equals one of the values, case-insensitive.
    RoleExact(&'static [&'static str]),
}

impl RemovalRule {
    /// Returns true if this rule removes the element.
    ///
    /// Comment nodes are not elements, see [`ExtractionPolicy::removes_comments`].
    pub fn matches(&self, element: &ElementData) -> bool {
        if STRUCTURAL_TAGS.contains(&element.name()) {
            return false;
        }

        match self {
            RemovalRule::Tag(tags) => tags.contains(&element.name()),
            RemovalRule::Comment => false,
            RemovalRule::ClassKeyword(keywords) => element.classes().any(|class| contains_keyword(class, keywords)),
            RemovalRule::RoleKeyword(keywords) => element
                .attr("role")
                .is_some_and(|role| contains_keyword(role, keywords)),
            RemovalRule::RoleExact(values) => element
                .attr("role")
                .is_some_and(|role| values.iter().any(|value| role.trim().eq_ignore_ascii_case(value))),
        }
    }
}

/// One step of the main-content priority list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSelector {
    /// Element with this tag name.
    Tag(&'static str),
    /// Element whose `role` equals the value, case-insensitive.
    Role(&'static str),
    /// Element with this tag whose class contains one of the keywords.
    TagWithClassKeyword(&'static str, &'static [&'static str]),
}

impl CandidateSelector {
    /// Returns true if the element satisfies this selector.
    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            CandidateSelector::Tag(tag) => element.name() == *tag,
            CandidateSelector::Role(role) => element
                .attr("role")
                .is_some_and(|value| value.trim().eq_ignore_ascii_case(role)),
            CandidateSelector::TagWithClassKeyword(tag, keywords) => {
                element.name() == *tag && element.classes().any(|class| contains_keyword(class, keywords))
            }
        }
    }
}

/// Removal rules plus the ordered candidate list. Immutable and shareable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPolicy {
    pub version: u32,
    pub removal: Vec<RemovalRule>,
    pub candidates: Vec<CandidateSelector>,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            version: RULES_VERSION,
            removal: vec![
                RemovalRule::Tag(BOILERPLATE_TAGS),
                RemovalRule::Comment,
                RemovalRule::ClassKeyword(NAVIGATION_KEYWORDS),
                RemovalRule::RoleKeyword(NAVIGATION_KEYWORDS),
                RemovalRule::RoleExact(BOILERPLATE_ROLES),
            ],
            candidates: vec![
                CandidateSelector::Tag("main"),
                CandidateSelector::Tag("article"),
                CandidateSelector::Role("main"),
                CandidateSelector::TagWithClassKeyword("div", CONTENT_CLASS_KEYWORDS),
            ],
        }
    }
}

impl ExtractionPolicy {
    /// Returns true if any removal rule matches the element.
    pub fn is_boilerplate(&self, element: &ElementData) -> bool {
        self.removal.iter().any(|rule| rule.matches(element))
    }

    /// Returns true if comment nodes are removed.
    pub fn removes_comments(&self) -> bool {
        self.removal.contains(&RemovalRule::Comment)
    }
}

fn contains_keyword(value: &str, keywords: &[&str]) -> bool {
    let value = value.to_ascii_lowercase();
    keywords.iter().any(|keyword| value.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use scraper::{Html, Selector};

    fn first_element(html: &str, selector: &str) -> ElementData {
        let doc = Html::parse_document(html);
        let sel = Selector::parse(selector).unwrap();
        doc.select(&sel).next().unwrap().value().clone()
    }

    #[rstest]
    #[case(r#"<nav id="x">Menu</nav>"#)]
    #[case(r#"<aside id="x">Related</aside>"#)]
    #[case(r#"<header id="x">Site</header>"#)]
    #[case(r#"<footer id="x">Copyright</footer>"#)]
    #[case(r#"<div id="x" class="left-Sidebar">x</div>"#)]
    #[case(r#"<div id="x" class="site-nav-links">x</div>"#)]
    #[case(r#"<ul id="x" class="MainMenu">x</ul>"#)]
    #[case(r#"<div id="x" class="sidenav">x</div>"#)]
    #[case(r#"<div id="x" role="navigation">x</div>"#)]
    #[case(r#"<div id="x" role="menubar">x</div>"#)]
    #[case(r#"<div id="x" role="complementary">x</div>"#)]
    fn test_default_policy_removes(#[case] html: &str) {
        let element = first_element(&format!("<html><body>{}</body></html>", html), "#x");
        assert!(ExtractionPolicy::default().is_boilerplate(&element), "{html}");
    }

    #[rstest]
    #[case(r#"<div id="x" class="content">x</div>"#)]
    #[case(r#"<p id="x" class="navigator">x</p>"#)]
    #[case(r#"<section id="x" role="main">x</section>"#)]
    #[case(r#"<article id="x">x</article>"#)]
    fn test_default_policy_keeps(#[case] html: &str) {
        let element = first_element(&format!("<html><body>{}</body></html>", html), "#x");
        assert!(!ExtractionPolicy::default().is_boilerplate(&element), "{html}");
    }

    #[test]
    fn test_structural_elements_never_removed() {
        let body = first_element(r#"<html><body class="has-sidebar menu-open"><p>x</p></body></html>"#, "body");
        assert!(!ExtractionPolicy::default().is_boilerplate(&body));
    }

    #[test]
    fn test_candidate_selectors() {
        let div = first_element(r#"<html><body><div class="Entry-Body">x</div></body></html>"#, "div");
        let span = first_element(r#"<html><body><span class="content">x</span></body></html>"#, "span");
        let role = first_element(r#"<html><body><div role=" Main ">x</div></body></html>"#, "div");

        let content_div = CandidateSelector::TagWithClassKeyword("div", CONTENT_CLASS_KEYWORDS);
        assert!(content_div.matches(&div));
        assert!(!content_div.matches(&span));
        assert!(CandidateSelector::Role("main").matches(&role));
    }

    #[test]
    fn test_default_policy_shape() {
        let policy = ExtractionPolicy::default();
        assert_eq!(policy.version, RULES_VERSION);
        assert!(policy.removes_comments());
        assert_eq!(policy.candidates[0], CandidateSelector::Tag("main"));
        assert_eq!(policy.candidates[1], CandidateSelector::Tag("article"));
    }
}
