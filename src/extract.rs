//! Per-listing field extraction and name-based deduplication.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::schema;
use crate::surface::{first_match, RenderSurface};
use crate::ListingRecord;

pub const PHONE_SENTINEL: &str = "Not Available";
pub const MISSING: &str = "N/A";

/// Heading texts that look like names but belong to page chrome.
const NON_NAMES: &[&str] = &["user", "average ratings"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameVerdict {
    Accepted(String),
    TooShort,
    NotAName,
    Duplicate,
}

/// Gate a resolved name. Accepted names are recorded in `seen` at once.
pub fn judge_name(raw: &str, seen: &mut HashSet<String>) -> NameVerdict {
    let name = raw.trim();
    if name.split_whitespace().count() < 2 {
        return NameVerdict::TooShort;
    }
    let lowered = name.to_lowercase();
    if NON_NAMES.contains(&lowered.as_str()) {
        return NameVerdict::NotAName;
    }
    if !seen.insert(name.to_owned()) {
        return NameVerdict::Duplicate;
    }
    NameVerdict::Accepted(name.to_owned())
}

pub fn normalize_phone(phone: Option<String>) -> String {
    match phone {
        Some(p) if p.chars().count() == 11 && p.starts_with('0') => p,
        _ => PHONE_SENTINEL.to_owned(),
    }
}

/// Leading whitespace token of the rating box, e.g. "4.5" from "4.5 out of 1000 ratings".
pub fn rating_token(text: &str) -> Option<String> {
    text.split_whitespace().next().map(str::to_owned)
}

/// Prefer the `tel:` target; otherwise the element's visible text.
pub fn phone_from(href: Option<&str>, text: &str) -> String {
    match href {
        Some(href) if href.contains("tel:") => href.replace("tel:", "").trim().to_owned(),
        _ => text.trim().to_owned(),
    }
}

pub fn resolve_name<'a, S: RenderSurface>(surface: &'a S, node: &S::Node<'a>) -> Option<String> {
    let element = first_match(surface, node, schema::NAME)?;
    surface.text_of(&element).ok()
}

pub fn resolve_phone<'a, S: RenderSurface>(
    surface: &'a S,
    node: &S::Node<'a>,
    reveal_settle: Duration,
) -> Option<String> {
    let control = first_match(surface, node, schema::SHOW_NUMBER)?;
    if let Err(err) = surface.click(&control) {
        debug!(%err, "show-number click failed");
        return None;
    }
    thread::sleep(reveal_settle);

    let element = first_match(surface, node, schema::PHONE)?;
    let href = surface.attribute_of(&element, "href").ok().flatten();
    let text = surface.text_of(&element).unwrap_or_default();
    Some(phone_from(href.as_deref(), &text))
}

pub fn resolve_address<'a, S: RenderSurface>(surface: &'a S, node: &S::Node<'a>) -> Option<String> {
    let element = first_match(surface, node, schema::ADDRESS)?;
    surface.text_of(&element).ok().map(|t| t.trim().to_owned())
}

pub fn resolve_rating<'a, S: RenderSurface>(surface: &'a S, node: &S::Node<'a>) -> Option<String> {
    let element = first_match(surface, node, schema::RATING)?;
    rating_token(&surface.text_of(&element).ok()?)
}

/// Lazy pass over the listing nodes of one page load.
///
/// Restarting means querying the surface again; the seen-name set lives and
/// dies with this value.
pub struct Listings<'s, S: RenderSurface + 's> {
    surface: &'s S,
    nodes: std::vec::IntoIter<S::Node<'s>>,
    seen: HashSet<String>,
    reveal_settle: Duration,
}

impl<'s, S: RenderSurface + 's> Listings<'s, S> {
    pub fn new(surface: &'s S, nodes: Vec<S::Node<'s>>, reveal_settle: Duration) -> Self {
        Self {
            surface,
            nodes: nodes.into_iter(),
            seen: HashSet::new(),
            reveal_settle,
        }
    }

    fn extract(&mut self, node: &S::Node<'s>) -> Option<ListingRecord> {
        let raw = resolve_name(self.surface, node)?;
        let name = match judge_name(&raw, &mut self.seen) {
            NameVerdict::Accepted(name) => name,
            verdict => {
                debug!(name = raw.trim(), ?verdict, "skipping listing");
                return None;
            }
        };

        let phone = normalize_phone(resolve_phone(self.surface, node, self.reveal_settle));
        let address = resolve_address(self.surface, node).unwrap_or_else(|| MISSING.to_owned());
        let rating = resolve_rating(self.surface, node).unwrap_or_else(|| MISSING.to_owned());

        Some(ListingRecord {
            name,
            phone,
            rating,
            address,
        })
    }
}

impl<'s, S: RenderSurface + 's> Iterator for Listings<'s, S> {
    type Item = ListingRecord;

    fn next(&mut self) -> Option<ListingRecord> {
        while let Some(node) = self.nodes.next() {
            if let Some(record) = self.extract(&node) {
                return Some(record);
            }
        }
        None
    }
}
