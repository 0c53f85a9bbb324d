//! Toolstash resolves a named tool to the rules that turn a version into a
//! filename and a download URL, downloads and caches versions on disk, and
//! hands cached artifacts to an install routine.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use toolstash::{ConfigResolver, ToolConfigRecord, Error};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! // toolsrc.yml:
//! //   demo:
//! //     filename: demo-%s.bin
//! //     downloadURL: https://example.test/%s/demo.bin
//! let resolver = ConfigResolver::new();
//! let installer = resolver.get("demo", &ToolConfigRecord::default(), true).await?;
//! let path = installer.download("3.2").await?;
//! println!("{}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`format`] - `%s` templates and the `versionFmt` grammar
//! - [`download`] - the cache-or-fetch decision and artifact storage
//! - [`installer`] - [`InstallerOptions`], [`InstallerBuilder`] and [`Installer`]
//! - [`config`] - configuration discovery and [`ConfigResolver`]
//! - [`error`] - centralized error handling with the [`Error`] enum
//! - [`http`] - HTTP client configuration
//! - [`progress`] - transfer progress bars
//! - [`utils`] - shared utility functions

pub mod config;
pub mod download;
pub mod error;
pub mod format;
pub mod http;
pub mod installer;
pub mod progress;
pub mod utils;

pub use config::{ConfigResolver, ConfigResolverBuilder, ToolConfigRecord};
pub use download::DownloadCache;
pub use error::{Error, Result};
pub use format::{Template, VersionFormat};
pub use http::{create_http_client, HttpClientConfig};
pub use installer::{install_fn, InstallFn, Installer, InstallerBuilder, InstallerOptions};
pub use progress::ProgressBarOpts;
