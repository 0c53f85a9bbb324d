//! The installer bound to one tool's options.
//!
//! # Examples
//!
//! ```rust,no_run
//! use toolstash::installer::{install_fn, InstallerBuilder};
//!
//! # async fn example() -> toolstash::Result<()> {
//! let installer = InstallerBuilder::new()
//!     .filename_template("code-%s.tar.gz")
//!     .download_url_template("https://update.code.visualstudio.com/%s/linux-x64/stable")
//!     .download_dir("~/.cache/tools/code")
//!     .install_fn(install_fn(|path| async move {
//!         println!("unpacking {}", path.display());
//!         Ok(())
//!     }))
//!     .build()?;
//!
//! installer.download("1.49").await?;
//! installer.install(None, false).await?;
//! # Ok(())
//! # }
//! ```

use super::options::{InstallFn, InstallerOptions, NameFn, VersionFn};
use crate::download::cache::is_part_file;
use crate::download::DownloadCache;
use crate::error::{Error, Result};
use crate::format::VersionFormat;
use crate::http::{create_http_client, HttpClientConfig};
use crate::progress::ProgressBarOpts;
use crate::utils::absolutize;

use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

/// Downloads and installs versions of one tool.
///
/// An installer is immutable once built. Its operations are independent of
/// each other; the only state they share is the download directory.
#[derive(Clone)]
pub struct Installer {
    filename: NameFn,
    version: Option<VersionFn>,
    version_fmt: Option<VersionFormat>,
    downloads: DownloadCache,
    install_fn: Option<InstallFn>,
}

impl fmt::Debug for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installer")
            .field("version", &self.version.is_some())
            .field("version_fmt", &self.version_fmt)
            .field("downloads", &self.downloads)
            .field("install_fn", &self.install_fn.is_some())
            .finish()
    }
}

impl Installer {
    /// Builds an installer with the default HTTP client and progress bar.
    pub fn new(options: InstallerOptions) -> Result<Self> {
        let client = create_http_client(HttpClientConfig::default())?;
        Self::with_transport(options, client, ProgressBarOpts::default())
    }

    /// Builds an installer using `client` for every fetch.
    pub(crate) fn with_transport(
        options: InstallerOptions,
        client: ClientWithMiddleware,
        progress: ProgressBarOpts,
    ) -> Result<Self> {
        let rule = options.filename.ok_or(Error::MissingField("filename"))?;
        let version = options.version.or_else(|| rule.derived_version_fn());

        let mut filename = rule.to_fn();
        let mut download_url = options.download_url.map(|rule| rule.to_fn());
        if let Some(version_fmt) = &options.version_fmt {
            filename = normalized(version_fmt, filename);
            download_url = download_url.map(|url| normalized(version_fmt, url));
        }

        let download_dir = absolutize(&options.download_dir.unwrap_or_default())?;
        let downloads = DownloadCache::new(
            download_dir,
            filename.clone(),
            download_url,
            options.cache.unwrap_or(true),
            client,
        )
        .with_progress(progress);

        Ok(Self {
            filename,
            version,
            version_fmt: options.version_fmt,
            downloads,
            install_fn: options.install_fn,
        })
    }

    /// Directory where versions are stored.
    pub fn download_dir(&self) -> &Path {
        self.downloads.download_dir()
    }

    /// Whether existing files satisfy downloads.
    pub fn cache(&self) -> bool {
        self.downloads.cache()
    }

    /// Whether a URL rule is configured.
    pub fn can_download(&self) -> bool {
        self.downloads.can_download()
    }

    /// Whether an install function is configured.
    pub fn can_install(&self) -> bool {
        self.install_fn.is_some()
    }

    /// Canonical form of `version` under the configured `versionFmt`.
    pub fn normalize_version(&self, version: &str) -> String {
        match &self.version_fmt {
            Some(version_fmt) => version_fmt.normalize(version),
            None => version.to_string(),
        }
    }

    /// Filename `version` is stored under.
    pub fn filename(&self, version: &str) -> String {
        (self.filename)(version)
    }

    /// Absolute path of the downloaded file for `version`.
    pub fn downloaded_file(&self, version: &str) -> Result<PathBuf> {
        self.downloads.target_path(version)
    }

    /// Downloads `version`, reusing a previous download when caching is on.
    pub async fn download(&self, version: &str) -> Result<PathBuf> {
        self.downloads.download(version).await
    }

    /// Downloads each version in turn.
    ///
    /// A failure is logged and reported for its version; the remaining
    /// versions are still attempted.
    pub async fn download_many<S: AsRef<str>>(
        &self,
        versions: &[S],
    ) -> Vec<(String, Result<PathBuf>)> {
        let mut results = Vec::with_capacity(versions.len());
        for version in versions {
            let version = version.as_ref();
            let result = self.download(version).await;
            if let Err(e) = &result {
                warn!("could not download {}: {}", version, e);
            }
            results.push((version.to_string(), result));
        }
        results
    }

    /// Installs `version`, or the latest downloaded version when `None`.
    ///
    /// A version that is not present locally is downloaded first unless
    /// `allow_download` is `false`. Errors from the install function are
    /// returned as they are.
    pub async fn install(&self, version: Option<&str>, allow_download: bool) -> Result<()> {
        let install_fn = self.install_fn.as_ref().ok_or(Error::InstallFnUndefined)?;

        let version = match version {
            Some(version) => version.to_string(),
            None => self.latest().await?.ok_or(Error::VersionNotFound)?,
        };

        let previous = self.downloaded_file(&version)?;
        if fs::try_exists(&previous).await? {
            info!("installing {} from {:?}", version, previous);
            return install_fn(previous).await;
        } else if !allow_download {
            return Err(Error::FileNotFoundOffline(version));
        }

        let downloaded = self.download(&version).await?;
        if !fs::try_exists(&downloaded).await? {
            return Err(Error::DownloadInstallFailed(version));
        }

        info!("installing {} from {:?}", version, downloaded);
        install_fn(downloaded).await
    }

    /// Versions present in the download directory, in listing order.
    ///
    /// Only files whose names yield a version count; unfinished transfers
    /// never do. A missing directory has no versions.
    pub async fn downloaded(&self) -> Result<Vec<String>> {
        let Some(version) = &self.version else {
            return Ok(Vec::new());
        };

        let mut entries = match fs::read_dir(self.download_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{:?} does not exist", self.download_dir());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if is_part_file(name) {
                continue;
            }
            if let Some(v) = version(name) {
                versions.push(v);
            }
        }
        Ok(versions)
    }

    /// The last entry of [`downloaded`](Self::downloaded).
    ///
    /// This follows directory-listing order, not version order.
    pub async fn latest(&self) -> Result<Option<String>> {
        Ok(self.downloaded().await?.pop())
    }
}

fn normalized(version_fmt: &VersionFormat, f: NameFn) -> NameFn {
    let version_fmt = version_fmt.clone();
    Arc::new(move |version| f(&version_fmt.normalize(version)))
}
