//! Cache-or-fetch logic for a single artifact.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use toolstash::download::DownloadCache;
//! use toolstash::http::{create_http_client, HttpClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = DownloadCache::new(
//!     "/tmp/tools".into(),
//!     Arc::new(|v: &str| format!("demo-{v}.bin")),
//!     Some(Arc::new(|v: &str| format!("https://example.test/{v}/demo.bin"))),
//!     true,
//!     create_http_client(HttpClientConfig::default())?,
//! );
//! let path = cache.download("3.2").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::installer::options::NameFn;
use crate::progress::{ProgressBarOpts, ProgressDisplay};
use crate::utils::{absolutize, expected_size};

use futures::StreamExt;
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};

/// Stores versions of one tool under a directory.
#[derive(Clone)]
pub struct DownloadCache {
    download_dir: PathBuf,
    filename: NameFn,
    download_url: Option<NameFn>,
    cache: bool,
    client: ClientWithMiddleware,
    progress: ProgressBarOpts,
}

impl fmt::Debug for DownloadCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadCache")
            .field("download_dir", &self.download_dir)
            .field("download_url", &self.download_url.is_some())
            .field("cache", &self.cache)
            .field("progress", &self.progress)
            .finish()
    }
}

impl DownloadCache {
    /// Creates a cache rooted at `download_dir`, which should be absolute.
    pub fn new(
        download_dir: PathBuf,
        filename: NameFn,
        download_url: Option<NameFn>,
        cache: bool,
        client: ClientWithMiddleware,
    ) -> Self {
        Self {
            download_dir,
            filename,
            download_url,
            cache,
            client,
            progress: ProgressBarOpts::default(),
        }
    }

    /// Sets the progress bar options used while fetching.
    pub fn with_progress(mut self, progress: ProgressBarOpts) -> Self {
        self.progress = progress;
        self
    }

    /// Directory where artifacts are stored.
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Whether an existing file satisfies a download.
    pub fn cache(&self) -> bool {
        self.cache
    }

    /// Whether a URL rule is configured.
    pub fn can_download(&self) -> bool {
        self.download_url.is_some()
    }

    /// Absolute path where `version` is stored.
    pub fn target_path(&self, version: &str) -> Result<PathBuf> {
        Ok(absolutize(&self.download_dir.join((self.filename)(version)))?)
    }

    /// URL `version` is fetched from.
    pub fn url(&self, version: &str) -> Result<String> {
        self.download_url
            .as_ref()
            .map(|url| url(version))
            .ok_or(Error::DownloadUrlUndefined)
    }

    /// Realizes `version` as a local file and returns its path.
    ///
    /// With caching enabled an existing file is returned without any network
    /// call. Otherwise the file is fetched, replacing whatever was there.
    pub async fn download(&self, version: &str) -> Result<PathBuf> {
        let target = self.target_path(version)?;

        if self.cache {
            if fs::try_exists(&target).await? {
                debug!("{} previously downloaded at {:?}", version, target);
                return Ok(target);
            }
            debug!("{} not downloaded yet", version);
        }

        let url = self.url(version)?;
        self.fetch(&url, &target).await?;
        Ok(target)
    }

    /// Fetches `url` into `target`.
    ///
    /// The body is streamed into a hidden `.part` sibling which is renamed
    /// onto `target` once complete, so readers never observe a partial file.
    async fn fetch(&self, url: &str, target: &Path) -> Result<()> {
        info!("downloading {}", url);
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let output_dir = target.parent().unwrap_or(target);
        debug!("Creating destination directory {:?}", output_dir);
        fs::create_dir_all(output_dir).await?;

        let part = part_path(target);
        let progress = ProgressDisplay::new(&self.progress, expected_size(&res), url);
        match write_body(res, &part, &progress).await {
            Ok(size) => {
                progress.finish();
                if let Err(e) = fs::rename(&part, target).await {
                    let _ = fs::remove_file(&part).await;
                    return Err(e.into());
                }
                info!("wrote {} bytes to {:?}", size, target);
                Ok(())
            }
            Err(e) => {
                progress.abandon();
                // The part file may never have been created.
                let _ = fs::remove_file(&part).await;
                Err(e)
            }
        }
    }
}

/// Whether `name` is the hidden sibling of an in-flight or abandoned
/// transfer.
pub(crate) fn is_part_file(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(PART_SUFFIX)
}

const PART_SUFFIX: &str = ".part";

/// Hidden sibling used while a transfer is in flight.
fn part_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}{PART_SUFFIX}"))
}

async fn write_body(
    res: reqwest::Response,
    part: &Path,
    progress: &ProgressDisplay,
) -> Result<u64> {
    debug!("Creating destination file {:?}", part);
    let mut file = fs::File::create(part).await?;
    let mut written = 0u64;

    let mut stream = res.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let mut chunk = chunk?;
        let size = chunk.len() as u64;
        file.write_all_buf(&mut chunk).await?;
        written += size;
        progress.inc(size);
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}
