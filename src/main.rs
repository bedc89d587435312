use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};

use justdial_scraper::browser::{ChromeSurface, LaunchProfile};
use justdial_scraper::config::DEFAULT_BASE_URL;
use justdial_scraper::snapshot::SnapshotSurface;
use justdial_scraper::{RunReport, ScrapeError, Scraper, SearchConfig, SinkOutcome, Timings};

#[derive(Parser)]
#[command(
    name = "justdial_scraper",
    about = "Collect business listings from a JustDial search into a CSV file"
)]
struct Cli {
    /// What to search for, e.g. "Wedding Planning" (prompted when missing)
    #[arg(short, long, env = "JD_QUERY")]
    query: Option<String>,

    /// City to search in, e.g. "Tirupati" (prompted when missing)
    #[arg(short, long, env = "JD_LOCATION")]
    location: Option<String>,

    #[arg(long, env = "JD_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory for the CSV and any page_source.html dump
    #[arg(short, long, env = "JD_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Run Chrome without a window
    #[arg(long, env = "JD_HEADLESS")]
    headless: bool,

    /// Chrome/Chromium binary to launch instead of the detected one
    #[arg(long, env = "JD_CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Read listings from a saved HTML page instead of launching a browser
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Stop scrolling after this many scrolls even if the page keeps growing
    #[arg(long, env = "JD_MAX_SCROLLS", value_parser = clap::value_parser!(u32).range(1..))]
    max_scrolls: Option<u32>,

    /// Seconds to wait for the page body
    #[arg(long, env = "JD_BODY_TIMEOUT", default_value_t = 10)]
    body_timeout: u64,

    /// Seconds to let JavaScript render before looking for listings
    #[arg(long, env = "JD_RENDER_WAIT", default_value_t = 15)]
    render_wait: u64,

    /// Seconds to wait for the listings container
    #[arg(long, env = "JD_LISTING_TIMEOUT", default_value_t = 50)]
    listing_timeout: u64,

    /// Seconds to pause after each scroll
    #[arg(long, env = "JD_SCROLL_SETTLE", default_value_t = 5)]
    scroll_settle: u64,

    /// Seconds to pause after clicking "Show Number"
    #[arg(long, env = "JD_REVEAL_SETTLE", default_value_t = 2)]
    reveal_settle: u64,
}

impl Cli {
    fn timings(&self) -> Timings {
        if self.replay.is_some() {
            return Timings {
                max_scrolls: self.max_scrolls,
                ..Timings::immediate()
            };
        }
        Timings {
            body_timeout: Duration::from_secs(self.body_timeout),
            render_wait: Duration::from_secs(self.render_wait),
            listing_timeout: Duration::from_secs(self.listing_timeout),
            scroll_settle: Duration::from_secs(self.scroll_settle),
            reveal_settle: Duration::from_secs(self.reveal_settle),
            max_scrolls: self.max_scrolls,
        }
    }

    fn into_config(self) -> Result<(SearchConfig, Option<PathBuf>)> {
        let query = match &self.query {
            Some(query) => query.clone(),
            None => prompt("🔍 What are you searching for (e.g., 'Wedding Planning'): ")?,
        };
        let location = match &self.location {
            Some(location) => location.clone(),
            None => prompt("📍 Enter location (e.g., 'Tirupati'): ")?,
        };

        let config = SearchConfig::new(&query, &location)
            .with_base_url(self.base_url.clone())
            .with_output_dir(self.output_dir.clone())
            .with_timings(self.timings())
            .with_launch(LaunchProfile {
                headless: self.headless,
                chrome_path: self.chrome_path.clone(),
            });
        if config.search_term().is_empty() || config.location().is_empty() {
            bail!("both a search term and a location are required");
        }
        Ok((config, self.replay))
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_owned())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let (config, replay) = Cli::parse().into_config()?;
    println!("🌐 Opening: {}", config.url());
    println!("📄 Output will be saved as: {}", config.file_name());

    let scraper = Scraper::new(config);
    let result = match replay {
        Some(path) => {
            let mut surface = SnapshotSurface::open(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            scraper.run(&mut surface)
        }
        None => {
            let mut surface = ChromeSurface::launch(scraper.config().launch())
                .context("failed to launch Chrome")?;
            let result = scraper.run(&mut surface);
            println!("🔚 Browser closed.");
            result
        }
    };

    match result {
        Ok(report) => summarize(&report),
        // Same exit status as a normal run; the page dump is the diagnostic.
        Err(ScrapeError::PageLoad { snapshot, .. }) => {
            if let Some(path) = snapshot {
                println!(
                    "📝 Saved page source to '{}'. Please check it for the page structure.",
                    path.display()
                );
            }
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

fn summarize(report: &RunReport) {
    match &report.output {
        SinkOutcome::Written { path, rows } => {
            info!(
                url = %report.url,
                listings = report.listings_found,
                scrolls = report.scroll.scrolls,
                rows,
                "run complete"
            );
            println!("✅ Data saved to {}", path.display());
        }
        SinkOutcome::Empty => {
            error!(
                url = %report.url,
                listings = report.listings_found,
                "no valid listings extracted"
            );
            println!("⚠️ No valid listings found. Check the listing selectors against the page.");
        }
    }
}
