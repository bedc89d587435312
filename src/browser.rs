//! Live Chrome session driven over the DevTools protocol.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{SurfaceError, SurfaceResult};
use crate::schema::{self, Matcher};
use crate::surface::RenderSurface;

#[derive(Debug, Clone, Default)]
pub struct LaunchProfile {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
}

pub struct ChromeSurface {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl ChromeSurface {
    pub fn launch(profile: &LaunchProfile) -> SurfaceResult<Self> {
        let args: Vec<&OsStr> = vec![
            OsStr::new("--start-maximized"),
            OsStr::new("--disable-blink-features=AutomationControlled"),
        ];
        let ignore_default_args: Vec<&OsStr> = vec![OsStr::new("--enable-automation")];

        info!(headless = profile.headless, "launching Chrome");
        let browser = Browser::new(LaunchOptions {
            headless: profile.headless,
            window_size: Some((1920, 1080)),
            path: profile.chrome_path.clone(),
            args,
            ignore_default_args,
            idle_browser_timeout: Duration::from_secs(600),
            ..Default::default()
        })
        .map_err(SurfaceError::driver)?;
        let tab = browser.new_tab().map_err(SurfaceError::driver)?;

        Ok(Self {
            browser: Some(browser),
            tab,
        })
    }

    fn query_all(&self, matchers: &[Matcher]) -> SurfaceResult<Vec<Element<'_>>> {
        let elements = self
            .tab
            .find_elements(&schema::selector_list(matchers))
            .map_err(SurfaceError::driver)?;
        Ok(elements
            .into_iter()
            .filter(|element| admitted(element, matchers))
            .collect())
    }
}

/// Text filter over an element a selector-list query returned. Purely
/// structural matchers never fetch the text.
fn admitted(element: &Element<'_>, matchers: &[Matcher]) -> bool {
    if matchers.iter().all(|m| m.text.is_none()) {
        return true;
    }
    let text = element.get_inner_text().unwrap_or_default();
    matchers.iter().any(|m| m.admits(&element.tag_name, &text))
}

impl RenderSurface for ChromeSurface {
    type Node<'a> = Element<'a> where Self: 'a;

    fn navigate(&self, url: &str) -> SurfaceResult<()> {
        self.tab.navigate_to(url).map_err(SurfaceError::driver)?;
        Ok(())
    }

    fn wait_until_present(&self, matchers: &[Matcher], timeout: Duration) -> SurfaceResult<()> {
        let selector = schema::selector_list(matchers);
        self.tab
            .wait_for_element_with_custom_timeout(&selector, timeout)
            .map(|_| ())
            .map_err(|err| {
                debug!(%selector, "wait failed: {err:#}");
                SurfaceError::Timeout {
                    query: schema::describe(matchers),
                    timeout,
                }
            })
    }

    fn find_all(&self, matchers: &[Matcher]) -> SurfaceResult<Vec<Element<'_>>> {
        self.query_all(matchers)
    }

    fn find_in<'a>(
        &'a self,
        scope: &Element<'a>,
        matchers: &[Matcher],
    ) -> SurfaceResult<Option<Element<'a>>> {
        // DOM.querySelectorAll reports "no match" as an error; treat it as absence.
        let Ok(candidates) = scope.find_elements(&schema::selector_list(matchers)) else {
            return Ok(None);
        };
        Ok(candidates
            .into_iter()
            .find(|element| admitted(element, matchers)))
    }

    fn run_script(&self, code: &str) -> SurfaceResult<Option<Value>> {
        let result = self.tab.evaluate(code, false).map_err(SurfaceError::driver)?;
        Ok(result.value)
    }

    fn current_html(&self) -> SurfaceResult<String> {
        self.tab.get_content().map_err(SurfaceError::driver)
    }

    fn click<'a>(&'a self, node: &Element<'a>) -> SurfaceResult<()> {
        node.click().map_err(SurfaceError::driver)?;
        Ok(())
    }

    fn text_of<'a>(&'a self, node: &Element<'a>) -> SurfaceResult<String> {
        node.get_inner_text().map_err(SurfaceError::driver)
    }

    fn attribute_of<'a>(&'a self, node: &Element<'a>, name: &str) -> SurfaceResult<Option<String>> {
        node.get_attribute_value(name).map_err(SurfaceError::driver)
    }

    fn close(&mut self) -> SurfaceResult<()> {
        let Some(browser) = self.browser.take() else {
            return Ok(());
        };
        let closed = self.tab.close(false).map(|_| ()).map_err(SurfaceError::driver);
        // Dropping the browser kills the Chrome process.
        drop(browser);
        closed
    }
}

impl Drop for ChromeSurface {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(%err, "browser did not close cleanly");
        }
    }
}
