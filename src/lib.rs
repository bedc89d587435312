pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod schema;
pub mod scroll;
pub mod sink;
pub mod snapshot;
pub mod surface;

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};

pub use config::{SearchConfig, Timings};
pub use error::{ScrapeError, SurfaceError};
pub use extract::Listings;
pub use scroll::ScrollOutcome;
pub use sink::{write_to_csv, RecordSink, SinkOutcome};
pub use surface::RenderSurface;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub name: String,
    pub phone: String,
    pub rating: String,
    pub address: String,
}

impl ListingRecord {
    /// Cells in CSV column order.
    pub fn cells(&self) -> [String; 4] {
        [
            self.name.clone(),
            self.phone.clone(),
            self.rating.clone(),
            self.address.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub url: String,
    pub listings_found: usize,
    pub scroll: ScrollOutcome,
    pub records: Vec<ListingRecord>,
    pub output: SinkOutcome,
}

pub struct Scraper {
    config: SearchConfig,
}

impl Scraper {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Full run against `surface`, which is closed afterwards whether or not
    /// the run succeeded.
    pub fn run<S: RenderSurface>(&self, surface: &mut S) -> Result<RunReport, ScrapeError> {
        let result = self.scrape_data(&*surface);
        if let Err(err) = surface.close() {
            warn!(%err, "closing the page failed");
        }
        result
    }

    pub fn scrape_data<S: RenderSurface>(&self, surface: &S) -> Result<RunReport, ScrapeError> {
        let url = self.config.url();
        let timings = self.config.timings();
        fs::create_dir_all(self.config.output_dir())?;

        info!(%url, "opening");
        surface.navigate(&url)?;

        info!("waiting for page to load");
        self.wait_or_dump(surface, "page body", schema::PAGE_BODY, timings.body_timeout)?;
        info!("page body loaded");

        info!(secs = timings.render_wait.as_secs(), "waiting for JavaScript to render listings");
        thread::sleep(timings.render_wait);

        self.wait_or_dump(surface, "listings", schema::LISTING, timings.listing_timeout)?;
        info!("listings container found");

        info!("scrolling to load all listings");
        let scroll =
            scroll::scroll_until_stable(surface, timings.scroll_settle, timings.max_scrolls)?;
        info!(scrolls = scroll.scrolls, height = scroll.final_height, "scrolling done");

        info!("collecting all visible listings");
        let nodes = match surface.find_all(schema::LISTING) {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(%err, "listing lookup failed");
                Vec::new()
            }
        };
        let listings_found = nodes.len();
        info!(count = listings_found, "found listings");

        let mut sink = RecordSink::new();
        for record in Listings::new(surface, nodes, timings.reveal_settle) {
            println!(
                "{}. {} | 📞 {} | ⭐ {} | 📍 {}",
                sink.len() + 1,
                record.name,
                record.phone,
                record.rating,
                record.address
            );
            sink.push(record);
        }

        let output = sink.finish(&self.config.output_path())?;
        match &output {
            SinkOutcome::Written { path, rows } => {
                info!(path = %path.display(), rows, "data saved");
                println!("\nSample Output (first 5 rows):");
                print!("{}", sink.preview());
            }
            SinkOutcome::Empty => {
                warn!(
                    "no valid listings found; check '{}' for the page structure",
                    config::SNAPSHOT_FILE
                );
            }
        }

        Ok(RunReport {
            url,
            listings_found,
            scroll,
            records: sink.records().to_vec(),
            output,
        })
    }

    /// A failed initial wait is fatal: save what the page looks like first.
    fn wait_or_dump<S: RenderSurface>(
        &self,
        surface: &S,
        stage: &'static str,
        matchers: &[schema::Matcher],
        timeout: Duration,
    ) -> Result<(), ScrapeError> {
        let Err(source) = surface.wait_until_present(matchers, timeout) else {
            return Ok(());
        };
        error!(stage, %source, "error loading page or listings");
        let snapshot = self.dump_snapshot(surface);
        Err(ScrapeError::PageLoad {
            stage,
            source,
            snapshot,
        })
    }

    fn dump_snapshot<S: RenderSurface>(&self, surface: &S) -> Option<PathBuf> {
        let path = self.config.snapshot_path();
        let saved = surface
            .current_html()
            .map_err(|err| err.to_string())
            .and_then(|html| fs::write(&path, html).map_err(|err| err.to_string()));
        match saved {
            Ok(()) => {
                info!(path = %path.display(), "saved page source; check it for the page structure");
                Some(path)
            }
            Err(err) => {
                error!(%err, "could not save page source");
                None
            }
        }
    }
}
