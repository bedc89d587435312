use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("timed out after {}s waiting for {query}", .timeout.as_secs())]
    Timeout { query: String, timeout: Duration },

    #[error("browser driver error: {0}")]
    Driver(String),
}

impl SurfaceError {
    /// headless_chrome reports everything as `anyhow::Error`; keep the full chain.
    pub fn driver(err: anyhow::Error) -> Self {
        Self::Driver(format!("{err:#}"))
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("page did not load ({stage}): {source}")]
    PageLoad {
        stage: &'static str,
        #[source]
        source: SurfaceError,
        snapshot: Option<PathBuf>,
    },

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;
