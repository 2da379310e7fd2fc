//! # Serial-dl Library
//!
//! Downloads every file of a numbered series, given only the URL of the last
//! file and the number of the first one.
//!
//! The naming pattern (directory, letters around the number, zero-fill width,
//! extension) is inferred from the sample URL, expanded into one URL per
//! number, and each file is fetched in order with a bounded number of retries.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Fetches page001.jpg ... page120.jpg into ./scans as 001.jpg ... 120.jpg
//!     serial_dl::download_series("https://example.com/book/page120.jpg", "001", "./scans").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Inspecting the Series
//!
//! ```rust
//! let spec = serial_dl::plan("https://example.com/book/page120.jpg", "001").unwrap();
//! let first = spec.expand().next().unwrap();
//! assert_eq!(first.source_url, "https://example.com/book/page001.jpg");
//! assert_eq!(spec.len(), 120);
//! ```

use std::path::Path;

use log::info;

pub use crate::core::error::{Error, Result};
pub use crate::core::fetcher::{
    FetchEvent, FetchObserver, FetchOptions, Fetcher, ItemOutcome, ATTEMPT_DELAY,
    BROWSER_USER_AGENT, MAX_RETRIES,
};
pub use crate::core::pattern::{
    compute_zero_fill_width, parse_directory, parse_extension, parse_numeric_token, parse_prefix,
    parse_suffix, SequenceSpec, TargetItem, Targets,
};

mod core;

/// Infer the series pattern without touching the network
///
/// # Arguments
/// * `sample_url` - URL of the last (highest-numbered) file of the series
/// * `start_token` - Number of the first file; its digit count sets the zero-fill width
pub fn plan(sample_url: &str, start_token: &str) -> Result<SequenceSpec> {
    SequenceSpec::infer(sample_url, start_token)
}

/// Download a whole series into `out_dir` with default options
///
/// Fails only when the pattern cannot be inferred or the run cannot be set up.
/// Files that still fail after their retries are skipped.
pub async fn download_series(
    sample_url: &str,
    start_token: &str,
    out_dir: impl AsRef<Path>,
) -> Result<()> {
    download_series_with_options(sample_url, start_token, out_dir, FetchOptions::default()).await
}

/// Download a whole series into `out_dir` with custom options
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::sync::Arc;
/// use serial_dl::{FetchEvent, FetchOptions};
///
/// let options = FetchOptions {
///     observer: Some(Arc::new(|event: &FetchEvent| {
///         if let FetchEvent::Attempt { position, total, .. } = event {
///             println!("Progress ... {position}/{total}");
///         }
///     })),
///     ..Default::default()
/// };
/// serial_dl::download_series_with_options(
///     "https://example.com/ep/track12.mp3",
///     "01",
///     "./tracks",
///     options,
/// ).await?;
/// # Ok(())
/// # }
/// ```
pub async fn download_series_with_options(
    sample_url: &str,
    start_token: &str,
    out_dir: impl AsRef<Path>,
    options: FetchOptions,
) -> Result<()> {
    let spec = SequenceSpec::infer(sample_url, start_token)?;
    info!(
        "Series {}/{}{{{}..{}}}{}{} ({} files)",
        spec.directory,
        spec.prefix,
        spec.token_for(spec.start_value),
        spec.token_for(spec.end_value),
        spec.suffix,
        spec.extension,
        spec.len()
    );

    let fetcher = Fetcher::new(options)?;
    fetcher.fetch_all(spec.expand(), out_dir.as_ref()).await
}
