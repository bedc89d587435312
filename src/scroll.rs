use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{SurfaceError, SurfaceResult};
use crate::surface::RenderSurface;

pub const HEIGHT_SCRIPT: &str = "document.body.scrollHeight";
pub const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub scrolls: u32,
    pub final_height: u64,
    /// False only when `max_scrolls` cut the loop short.
    pub stabilized: bool,
}

/// Scroll to the bottom until two consecutive height readings agree.
///
/// With `max_scrolls` unset the loop has no bound; an endlessly growing page
/// keeps it running.
pub fn scroll_until_stable<S: RenderSurface>(
    surface: &S,
    settle: Duration,
    max_scrolls: Option<u32>,
) -> SurfaceResult<ScrollOutcome> {
    let mut last_height = document_height(surface)?;
    let mut scrolls = 0;

    loop {
        surface.run_script(SCROLL_SCRIPT)?;
        scrolls += 1;
        thread::sleep(settle);

        let new_height = document_height(surface)?;
        debug!(scrolls, last_height, new_height, "scrolled");
        if new_height == last_height {
            return Ok(ScrollOutcome {
                scrolls,
                final_height: new_height,
                stabilized: true,
            });
        }
        last_height = new_height;

        if max_scrolls.is_some_and(|cap| scrolls >= cap) {
            warn!(scrolls, height = last_height, "scroll cap reached before the page settled");
            return Ok(ScrollOutcome {
                scrolls,
                final_height: last_height,
                stabilized: false,
            });
        }
    }
}

fn document_height<S: RenderSurface>(surface: &S) -> SurfaceResult<u64> {
    match surface.run_script(HEIGHT_SCRIPT)? {
        Some(value) => parse_height(&value)
            .ok_or_else(|| SurfaceError::Driver(format!("unexpected scroll height {value}"))),
        None => Err(SurfaceError::Driver("scroll height script returned nothing".into())),
    }
}

fn parse_height(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|h| *h >= 0.0).map(|h| h.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Matcher;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// Replays a fixed series of height readings and counts scroll commands.
    struct ScriptedHeights {
        heights: RefCell<VecDeque<u64>>,
        scrolls: Cell<u32>,
    }

    impl ScriptedHeights {
        fn new(heights: &[u64]) -> Self {
            Self {
                heights: RefCell::new(heights.iter().copied().collect()),
                scrolls: Cell::new(0),
            }
        }
    }

    impl RenderSurface for ScriptedHeights {
        type Node<'a> = () where Self: 'a;

        fn navigate(&self, _url: &str) -> SurfaceResult<()> {
            Ok(())
        }

        fn wait_until_present(&self, _: &[Matcher], _: Duration) -> SurfaceResult<()> {
            Ok(())
        }

        fn find_all(&self, _: &[Matcher]) -> SurfaceResult<Vec<()>> {
            Ok(Vec::new())
        }

        fn find_in<'a>(&'a self, _: &(), _: &[Matcher]) -> SurfaceResult<Option<()>> {
            Ok(None)
        }

        fn run_script(&self, code: &str) -> SurfaceResult<Option<Value>> {
            if code == SCROLL_SCRIPT {
                self.scrolls.set(self.scrolls.get() + 1);
                return Ok(None);
            }
            let next = self
                .heights
                .borrow_mut()
                .pop_front()
                .expect("height sequence exhausted");
            Ok(Some(Value::from(next)))
        }

        fn current_html(&self) -> SurfaceResult<String> {
            Ok(String::new())
        }

        fn click<'a>(&'a self, _: &()) -> SurfaceResult<()> {
            Ok(())
        }

        fn text_of<'a>(&'a self, _: &()) -> SurfaceResult<String> {
            Ok(String::new())
        }

        fn attribute_of<'a>(&'a self, _: &(), _: &str) -> SurfaceResult<Option<String>> {
            Ok(None)
        }

        fn close(&mut self) -> SurfaceResult<()> {
            Ok(())
        }
    }

    #[test]
    fn equal_heights_stop_after_one_scroll() {
        let surface = ScriptedHeights::new(&[1000, 1000]);
        let outcome = scroll_until_stable(&surface, Duration::ZERO, None).unwrap();
        assert_eq!(surface.scrolls.get(), 1);
        assert_eq!(
            outcome,
            ScrollOutcome {
                scrolls: 1,
                final_height: 1000,
                stabilized: true
            }
        );
    }

    #[test]
    fn growth_then_plateau_takes_two_scrolls() {
        let surface = ScriptedHeights::new(&[1000, 1500, 1500]);
        let outcome = scroll_until_stable(&surface, Duration::ZERO, None).unwrap();
        assert_eq!(surface.scrolls.get(), 2);
        assert_eq!(outcome.final_height, 1500);
        assert!(outcome.stabilized);
    }

    #[test]
    fn cap_stops_a_growing_page() {
        let surface = ScriptedHeights::new(&[1000, 2000, 3000, 4000, 5000]);
        let outcome = scroll_until_stable(&surface, Duration::ZERO, Some(3)).unwrap();
        assert_eq!(surface.scrolls.get(), 3);
        assert_eq!(outcome.final_height, 4000);
        assert!(!outcome.stabilized);
    }

    #[test]
    fn cap_does_not_fire_when_page_settles_first() {
        let surface = ScriptedHeights::new(&[1000, 1200, 1200]);
        let outcome = scroll_until_stable(&surface, Duration::ZERO, Some(2)).unwrap();
        assert_eq!(outcome.scrolls, 2);
        assert!(outcome.stabilized);
    }

    #[test]
    fn fractional_heights_are_rounded() {
        assert_eq!(parse_height(&serde_json::json!(1234.6)), Some(1235));
        assert_eq!(parse_height(&serde_json::json!("tall")), None);
    }
}
