use std::time::Duration;

use serde_json::Value;

use crate::error::SurfaceResult;
use crate::schema::{self, Matcher};

/// A controllable page: the live browser tab, or a saved snapshot of one.
///
/// Nodes borrow the surface, so every node must be dropped before `close`.
pub trait RenderSurface {
    type Node<'a>
    where
        Self: 'a;

    fn navigate(&self, url: &str) -> SurfaceResult<()>;

    /// Block until at least one node matches any of `matchers`, or fail with
    /// [`SurfaceError::Timeout`](crate::error::SurfaceError::Timeout).
    fn wait_until_present(&self, matchers: &[Matcher], timeout: Duration) -> SurfaceResult<()>;

    /// Every node matching any of `matchers`, in document order.
    fn find_all(&self, matchers: &[Matcher]) -> SurfaceResult<Vec<Self::Node<'_>>>;

    /// Earliest descendant of `scope`, in document order, matching any of
    /// `matchers`.
    fn find_in<'a>(
        &'a self,
        scope: &Self::Node<'a>,
        matchers: &[Matcher],
    ) -> SurfaceResult<Option<Self::Node<'a>>>;

    fn run_script(&self, code: &str) -> SurfaceResult<Option<Value>>;

    fn current_html(&self) -> SurfaceResult<String>;

    fn click<'a>(&'a self, node: &Self::Node<'a>) -> SurfaceResult<()>;

    fn text_of<'a>(&'a self, node: &Self::Node<'a>) -> SurfaceResult<String>;

    fn attribute_of<'a>(
        &'a self,
        node: &Self::Node<'a>,
        name: &str,
    ) -> SurfaceResult<Option<String>>;

    fn close(&mut self) -> SurfaceResult<()>;
}

/// Whichever node inside `scope` comes first in the page and matches any of
/// `matchers`. A failed lookup counts as a miss.
pub fn first_match<'a, S: RenderSurface>(
    surface: &'a S,
    scope: &S::Node<'a>,
    matchers: &[Matcher],
) -> Option<S::Node<'a>> {
    match surface.find_in(scope, matchers) {
        Ok(found) => found,
        Err(err) => {
            tracing::trace!(query = %schema::describe(matchers), %err, "lookup failed");
            None
        }
    }
}
