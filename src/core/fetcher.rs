//! Sequential fetching for serial-dl
//!
//! Items are fetched one at a time, in series order. Each item gets one
//! attempt plus a bounded number of retries; an item that runs out of retries
//! is logged and skipped, and the run moves on to the next one.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::TryStreamExt;
use log::{debug, info, warn};
use reqwest::{Client, ClientBuilder};
use tokio::io::AsyncWriteExt;

use crate::core::error::{Error, Result};
use crate::core::pattern::TargetItem;

/// Retries allowed per item after its first attempt
pub const MAX_RETRIES: u32 = 3;

/// Pause before every attempt, retries included
pub const ATTEMPT_DELAY: Duration = Duration::from_millis(500);

/// Desktop browser identification sent with every request.
///
/// Some file hosts reject requests from unknown clients outright.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/36.0.1941.0 Safari/537.36";

/// Progress notifications emitted while a run is fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// About to request item `position` of `total`
    Attempt {
        position: usize,
        total: usize,
        attempt: u32,
        url: String,
    },

    /// An attempt failed and the item will be tried again
    Retry {
        position: usize,
        retry: u32,
        max_retries: u32,
        reason: String,
    },

    /// Item written to disk
    Succeeded {
        position: usize,
        bytes: u64,
        file_name: String,
    },

    /// Item abandoned after exhausting its retries
    Failed {
        position: usize,
        url: String,
        reason: String,
    },
}

/// Callback receiving every [`FetchEvent`]
pub type FetchObserver = Arc<dyn Fn(&FetchEvent) + Send + Sync>;

/// Options for a fetch run
#[derive(Clone)]
pub struct FetchOptions {
    /// Retries per item after the first attempt
    pub max_retries: u32,

    /// Delay before each attempt
    pub attempt_delay: Duration,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Optional progress observer
    pub observer: Option<FetchObserver>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            attempt_delay: ATTEMPT_DELAY,
            user_agent: BROWSER_USER_AGENT.to_string(),
            observer: None,
        }
    }
}

/// Final state of one item
#[derive(Debug)]
pub enum ItemOutcome {
    Succeeded { bytes: u64, attempts: u32 },
    Failed { attempts: u32, reason: Error },
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Succeeded { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ItemOutcome::Succeeded { attempts, .. } | ItemOutcome::Failed { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Fetches series items over HTTP, one at a time
pub struct Fetcher {
    client: Client,
    options: FetchOptions,
}

impl Fetcher {
    /// Build a fetcher with its own HTTP client carrying `options.user_agent`
    pub fn new(options: FetchOptions) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(options.user_agent.clone())
            .build()?;

        Ok(Self { client, options })
    }

    /// Fetch every target into `out_dir`, in order.
    ///
    /// `out_dir` is created if missing. Failing to create it is the only
    /// error returned; per-item failures are reported through logging and
    /// the observer.
    pub async fn fetch_all<I>(&self, targets: I, out_dir: &Path) -> Result<()>
    where
        I: IntoIterator<Item = TargetItem>,
        I::IntoIter: ExactSizeIterator,
    {
        tokio::fs::create_dir_all(out_dir).await?;

        let targets = targets.into_iter();
        let total = targets.len();
        let mut failed = 0usize;

        for item in targets {
            if !self.fetch_item(&item, total, out_dir).await.is_success() {
                failed += 1;
            }
        }

        info!("Fetched {} of {total} files into {}", total - failed, out_dir.display());
        Ok(())
    }

    /// Fetch one item, retrying until it succeeds or runs out of retries
    pub async fn fetch_item(&self, item: &TargetItem, total: usize, out_dir: &Path) -> ItemOutcome {
        let destination = item.destination_in(out_dir);
        let max_retries = self.options.max_retries;
        let mut retries = 0u32;

        loop {
            let attempt = retries + 1;

            if !self.options.attempt_delay.is_zero() {
                tokio::time::sleep(self.options.attempt_delay).await;
            }

            debug!("Progress ... {}/{total} (attempt {attempt})", item.position);
            self.notify(FetchEvent::Attempt {
                position: item.position,
                total,
                attempt,
                url: item.source_url.clone(),
            });

            match self.download_to(&item.source_url, &destination).await {
                Ok(bytes) => {
                    debug!("Saved {} ({bytes} bytes)", destination.display());
                    self.notify(FetchEvent::Succeeded {
                        position: item.position,
                        bytes,
                        file_name: item.file_name.clone(),
                    });
                    return ItemOutcome::Succeeded { bytes, attempts: attempt };
                }
                Err(e) => {
                    retries += 1;
                    if retries > max_retries {
                        warn!("Download failed after {attempt} attempts: {} ({e})", item.source_url);
                        self.notify(FetchEvent::Failed {
                            position: item.position,
                            url: item.source_url.clone(),
                            reason: e.to_string(),
                        });
                        return ItemOutcome::Failed { attempts: attempt, reason: e };
                    }

                    info!("Download error: {e}. Retry: {retries}/{max_retries}");
                    self.notify(FetchEvent::Retry {
                        position: item.position,
                        retry: retries,
                        max_retries,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Single attempt: GET `url` and stream the body into `destination`
    async fn download_to(&self, url: &str, destination: &Path) -> Result<u64> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("Failed to download: {status}")));
        }

        let mut file = tokio::fs::File::create(destination).await?;
        match write_body(response, &mut file).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                drop(file);
                // A half-written file must not survive a failed attempt
                if let Err(remove_err) = tokio::fs::remove_file(destination).await {
                    debug!("Could not remove partial {}: {remove_err}", destination.display());
                }
                Err(e)
            }
        }
    }

    fn notify(&self, event: FetchEvent) {
        if let Some(ref observer) = self.options.observer {
            observer(&event);
        }
    }
}

async fn write_body(response: reqwest::Response, file: &mut tokio::fs::File) -> Result<u64> {
    let mut body = tokio_util::io::StreamReader::new(
        response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
    );

    let bytes = tokio::io::copy(&mut body, file)
        .await
        .map_err(|e| Error::NetworkError(format!("Stream read error: {e}")))?;
    file.flush().await?;
    Ok(bytes)
}
