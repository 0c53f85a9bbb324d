//! Builder pattern implementation for creating [`Installer`] instances.
//!
//! Templates and the version grammar are compiled when
//! [`build`](InstallerBuilder::build) runs, so every configuration error is
//! reported in one place.
//!
//! ```rust
//! use toolstash::installer::InstallerBuilder;
//!
//! let installer = InstallerBuilder::new()
//!     .filename_template("demo-%s.bin")
//!     .download_url_template("https://example.test/%s/demo.bin")
//!     .version_fmt("#.#")
//!     .download_dir("downloads")
//!     .build()?;
//! assert_eq!(installer.filename("3"), "demo-3.0.bin");
//! # Ok::<(), toolstash::Error>(())
//! ```

use super::installer::Installer;
use super::options::{FilenameRule, InstallFn, InstallerOptions, UrlRule};
use crate::error::Result;
use crate::format::VersionFormat;
use crate::http::{create_http_client, HttpClientConfig};
use crate::progress::ProgressBarOpts;

use reqwest_middleware::ClientWithMiddleware;
use std::path::PathBuf;
use std::sync::Arc;

/// A builder used to create an [`Installer`].
#[derive(Default)]
pub struct InstallerBuilder {
    options: InstallerOptions,
    filename_template: Option<String>,
    download_url_template: Option<String>,
    version_fmt: Option<String>,
    http_config: HttpClientConfig,
    client: Option<ClientWithMiddleware>,
    progress: ProgressBarOpts,
}

impl InstallerBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        InstallerBuilder::default()
    }

    /// Starts from already resolved options.
    pub fn from_options(options: InstallerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Names downloaded files with a `%s` template.
    pub fn filename_template(mut self, template: impl Into<String>) -> Self {
        self.filename_template = Some(template.into());
        self.options.filename = None;
        self
    }

    /// Names downloaded files with a function.
    pub fn filename_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.filename_template = None;
        self.options.filename = Some(FilenameRule::function(f));
        self
    }

    /// Recovers versions from filenames with a function.
    ///
    /// Needed for [`Installer::downloaded`] when the filename is not a
    /// template.
    pub fn version_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.options.version = Some(Arc::new(f));
        self
    }

    /// Builds download URLs with a `%s` template.
    pub fn download_url_template(mut self, template: impl Into<String>) -> Self {
        self.download_url_template = Some(template.into());
        self.options.download_url = None;
        self
    }

    /// Builds download URLs with a function.
    pub fn download_url_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.download_url_template = None;
        self.options.download_url = Some(UrlRule::function(f));
        self
    }

    /// Canonicalizes versions with a `#` grammar before naming.
    pub fn version_fmt(mut self, version_fmt: impl Into<String>) -> Self {
        self.version_fmt = Some(version_fmt.into());
        self
    }

    /// Sets the directory where to store the downloads.
    pub fn download_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.options.download_dir = Some(directory.into());
        self
    }

    /// Set whether existing files satisfy downloads.
    pub fn cache(mut self, cache: bool) -> Self {
        self.options.cache = Some(cache);
        self
    }

    /// Sets the install routine.
    pub fn install_fn(mut self, install_fn: InstallFn) -> Self {
        self.options.install_fn = Some(install_fn);
        self
    }

    /// Configures the HTTP client built for this installer.
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Uses an existing HTTP client instead of building one.
    pub fn client(mut self, client: ClientWithMiddleware) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the progress bar options.
    pub fn progress(mut self, progress: ProgressBarOpts) -> Self {
        self.progress = progress;
        self
    }

    /// Create the [`Installer`] with the specified options.
    pub fn build(self) -> Result<Installer> {
        let mut options = self.options;
        if let Some(template) = &self.filename_template {
            options.filename = Some(FilenameRule::template(template)?);
        }
        if let Some(template) = &self.download_url_template {
            options.download_url = Some(UrlRule::template(template)?);
        }
        if let Some(version_fmt) = self.version_fmt {
            options.version_fmt = Some(VersionFormat::new(version_fmt)?);
        }

        let client = match self.client {
            Some(client) => client,
            None => create_http_client(self.http_config)?,
        };
        Installer::with_transport(options, client, self.progress)
    }
}
