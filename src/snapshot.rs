//! Offline surface over a saved results page.
//!
//! Nothing renders and nothing grows: waits are answered on the spot and the
//! document height never changes, so the scroll loop settles after one pass.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::time::Duration;

use select::document::Document;
use select::node::Node as HtmlNode;
use select::predicate::Any;
use serde_json::Value;
use tracing::debug;

use crate::error::{SurfaceError, SurfaceResult};
use crate::schema::{self, Matcher};
use crate::surface::RenderSurface;

pub struct SnapshotSurface {
    html: String,
    document: Document,
    visited: RefCell<Vec<String>>,
}

impl SnapshotSurface {
    pub fn from_html(html: &str) -> Self {
        Self {
            html: html.to_owned(),
            document: Document::from(html),
            visited: RefCell::new(Vec::new()),
        }
    }

    pub fn open(path: &Path) -> std::io::Result<Self> {
        let html = fs::read_to_string(path)?;
        Ok(Self::from_html(&html))
    }

    /// URLs passed to `navigate`, oldest first.
    pub fn visited(&self) -> Vec<String> {
        self.visited.borrow().clone()
    }

    fn height(&self) -> u64 {
        self.html.len() as u64
    }
}

impl RenderSurface for SnapshotSurface {
    type Node<'a> = HtmlNode<'a> where Self: 'a;

    fn navigate(&self, url: &str) -> SurfaceResult<()> {
        debug!(%url, "snapshot ignores navigation");
        self.visited.borrow_mut().push(url.to_owned());
        Ok(())
    }

    fn wait_until_present(&self, matchers: &[Matcher], timeout: Duration) -> SurfaceResult<()> {
        if self
            .document
            .find(Any)
            .any(|node| matchers.iter().any(|m| m.matches(&node)))
        {
            Ok(())
        } else {
            Err(SurfaceError::Timeout {
                query: schema::describe(matchers),
                timeout,
            })
        }
    }

    fn find_all(&self, matchers: &[Matcher]) -> SurfaceResult<Vec<HtmlNode<'_>>> {
        Ok(self
            .document
            .find(Any)
            .filter(|node| matchers.iter().any(|m| m.matches(node)))
            .collect())
    }

    fn find_in<'a>(
        &'a self,
        scope: &HtmlNode<'a>,
        matchers: &[Matcher],
    ) -> SurfaceResult<Option<HtmlNode<'a>>> {
        Ok(scope
            .descendants()
            .find(|node| matchers.iter().any(|m| m.matches(node))))
    }

    fn run_script(&self, code: &str) -> SurfaceResult<Option<Value>> {
        if code.contains("scrollTo") {
            return Ok(None);
        }
        Ok(Some(Value::from(self.height())))
    }

    fn current_html(&self) -> SurfaceResult<String> {
        Ok(self.html.clone())
    }

    fn click<'a>(&'a self, _node: &HtmlNode<'a>) -> SurfaceResult<()> {
        Ok(())
    }

    fn text_of<'a>(&'a self, node: &HtmlNode<'a>) -> SurfaceResult<String> {
        Ok(node.text())
    }

    fn attribute_of<'a>(
        &'a self,
        node: &HtmlNode<'a>,
        name: &str,
    ) -> SurfaceResult<Option<String>> {
        Ok(node.attr(name).map(str::to_owned))
    }

    fn close(&mut self) -> SurfaceResult<()> {
        Ok(())
    }
}
