use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::browser::LaunchProfile;

pub const DEFAULT_BASE_URL: &str = "https://www.justdial.com";
pub const SNAPSHOT_FILE: &str = "page_source.html";

/// Settle intervals and wait bounds for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub body_timeout: Duration,
    pub render_wait: Duration,
    pub listing_timeout: Duration,
    pub scroll_settle: Duration,
    pub reveal_settle: Duration,
    /// Unset keeps scrolling for as long as the page grows.
    pub max_scrolls: Option<u32>,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            body_timeout: Duration::from_secs(10),
            render_wait: Duration::from_secs(15),
            listing_timeout: Duration::from_secs(50),
            scroll_settle: Duration::from_secs(5),
            reveal_settle: Duration::from_secs(2),
            max_scrolls: None,
        }
    }
}

impl Timings {
    /// No pauses at all; for replaying a saved page.
    pub fn immediate() -> Self {
        Self {
            render_wait: Duration::ZERO,
            scroll_settle: Duration::ZERO,
            reveal_settle: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Everything a run needs, fixed once the inputs have been read.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    search_term: String,
    location: String,
    base_url: String,
    output_dir: PathBuf,
    timings: Timings,
    launch: LaunchProfile,
}

impl SearchConfig {
    pub fn new(search_term: &str, location: &str) -> Self {
        Self {
            search_term: hyphenate(search_term),
            location: capitalize(&hyphenate(location)),
            base_url: DEFAULT_BASE_URL.to_owned(),
            output_dir: PathBuf::from("."),
            timings: Timings::default(),
            launch: LaunchProfile::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_launch(mut self, launch: LaunchProfile) -> Self {
        self.launch = launch;
        self
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn launch(&self) -> &LaunchProfile {
        &self.launch
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Inputs go into the path as-is; nothing is percent-encoded.
    pub fn url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.location,
            self.search_term
        )
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}s-at-{}.csv",
            self.search_term,
            self.location.to_lowercase()
        )
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.file_name())
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.output_dir.join(SNAPSHOT_FILE)
    }
}

fn hyphenate(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join("-")
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
