//! Structural queries for the JustDial results markup.
//!
//! Each field has a list of named matchers. A lookup takes whichever element
//! comes first in the page and satisfies any of them, the same answer a
//! union query gives.

use select::node::Node;

/// Attribute test applied to a candidate element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrTest {
    Any,
    Present(&'static str),
    Contains(&'static str, &'static str),
}

/// One structural query: tag name, attribute test and optional text filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    pub name: &'static str,
    pub tag: &'static str,
    pub attr: AttrTest,
    /// Substring the element's visible text must contain.
    pub text: Option<&'static str>,
}

impl Matcher {
    pub const fn tag(name: &'static str, tag: &'static str) -> Self {
        Self {
            name,
            tag,
            attr: AttrTest::Any,
            text: None,
        }
    }

    pub const fn with_attr(name: &'static str, tag: &'static str, attr: &'static str) -> Self {
        Self {
            name,
            tag,
            attr: AttrTest::Present(attr),
            text: None,
        }
    }

    pub const fn attr_contains(
        name: &'static str,
        tag: &'static str,
        attr: &'static str,
        needle: &'static str,
    ) -> Self {
        Self {
            name,
            tag,
            attr: AttrTest::Contains(attr, needle),
            text: None,
        }
    }

    pub const fn class_contains(
        name: &'static str,
        tag: &'static str,
        needle: &'static str,
    ) -> Self {
        Self::attr_contains(name, tag, "class", needle)
    }

    pub const fn text_contains(
        name: &'static str,
        tag: &'static str,
        needle: &'static str,
    ) -> Self {
        Self {
            name,
            tag,
            attr: AttrTest::Any,
            text: Some(needle),
        }
    }

    /// CSS form of the structural part. The text filter has no CSS
    /// equivalent and is applied by the caller.
    pub fn css(&self) -> String {
        match self.attr {
            AttrTest::Any => self.tag.to_owned(),
            AttrTest::Present(attr) => format!("{}[{}]", self.tag, attr),
            AttrTest::Contains(attr, needle) => format!("{}[{}*='{}']", self.tag, attr, needle),
        }
    }

    pub fn accepts_text(&self, text: &str) -> bool {
        self.text.map_or(true, |needle| text.contains(needle))
    }

    /// Whether a live element with this tag name and visible text can pass.
    /// The attribute test is left to the CSS query that produced it.
    pub fn admits(&self, tag: &str, text: &str) -> bool {
        tag.eq_ignore_ascii_case(self.tag) && self.accepts_text(text)
    }

    /// Evaluate against a parsed snapshot node.
    pub fn matches(&self, node: &Node) -> bool {
        let Some(tag) = node.name() else {
            return false;
        };
        if !tag.eq_ignore_ascii_case(self.tag) {
            return false;
        }
        let attr_ok = match self.attr {
            AttrTest::Any => true,
            AttrTest::Present(attr) => node.attr(attr).is_some(),
            AttrTest::Contains(attr, needle) => node.attr(attr).is_some_and(|v| v.contains(needle)),
        };
        attr_ok && self.accepts_text(&node.text())
    }
}

/// CSS selector list matching any of the given matchers.
pub fn selector_list(matchers: &[Matcher]) -> String {
    matchers
        .iter()
        .map(Matcher::css)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn describe(matchers: &[Matcher]) -> String {
    matchers
        .iter()
        .map(|m| m.name)
        .collect::<Vec<_>>()
        .join(" | ")
}

pub const PAGE_BODY: &[Matcher] = &[Matcher::tag("body", "body")];

pub const LISTING: &[Matcher] = &[
    Matcher::class_contains("store-card", "div", "store"),
    Matcher::class_contains("result-card", "div", "result"),
    Matcher::tag("section", "section"),
];

pub const NAME: &[Matcher] = &[
    Matcher::tag("heading", "h2"),
    Matcher::with_attr("titled-link", "a", "title"),
    Matcher::class_contains("name-span", "span", "name"),
];

pub const SHOW_NUMBER: &[Matcher] = &[
    Matcher::text_contains("show-number-link", "a", "Show Number"),
    Matcher::text_contains("show-number-button", "button", "Show Number"),
];

pub const PHONE: &[Matcher] = &[
    Matcher::attr_contains("tel-link", "a", "href", "tel:"),
    Matcher::class_contains("call-content", "span", "callcontent"),
];

pub const ADDRESS: &[Matcher] = &[
    Matcher::class_contains("locality", "div", "locatcity"),
    Matcher::class_contains("address-paragraph", "p", "address"),
    Matcher::class_contains("address-span", "span", "addr"),
];

pub const RATING: &[Matcher] = &[
    Matcher::class_contains("total-rating", "div", "resultbox_totalrate"),
    Matcher::class_contains("rating-span", "span", "rating"),
];
