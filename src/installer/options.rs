//! Per-tool installer options.
//!
//! [`InstallerOptions`] is the fully resolved form of a tool's configuration:
//! every rule is either a compiled [`Template`] or a live function, and the
//! install routine is a ready-to-call [`InstallFn`]. Fields left as `None`
//! fall back to the defaults applied when an [`Installer`] is built.
//!
//! [`Installer`]: crate::installer::Installer

use crate::error::Result;
use crate::format::{Template, VersionFormat};

use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// Maps a version to a filename or URL.
pub type NameFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Maps a filename back to the version it was produced from.
pub type VersionFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Installs the artifact stored at the given path.
pub type InstallFn = Arc<dyn Fn(PathBuf) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Wraps an async closure into an [`InstallFn`].
///
/// ```rust
/// use toolstash::installer::install_fn;
///
/// let install = install_fn(|path| async move {
///     println!("installing {}", path.display());
///     Ok(())
/// });
/// ```
pub fn install_fn<F, Fut>(f: F) -> InstallFn
where
    F: Fn(PathBuf) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |path| Box::pin(f(path)))
}

/// How the filename of a downloaded version is produced.
#[derive(Clone)]
pub enum FilenameRule {
    /// `%s` template; its inverse is derived automatically.
    Template(Template),
    /// Caller-supplied function.
    Function(NameFn),
}

/// How the download URL of a version is produced.
#[derive(Clone)]
pub enum UrlRule {
    Template(Template),
    Function(NameFn),
}

impl FilenameRule {
    pub fn template(template: &str) -> Result<Self> {
        Ok(Self::Template(Template::new(template)?))
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    pub(crate) fn to_fn(&self) -> NameFn {
        match self {
            Self::Template(template) => {
                let template = template.clone();
                Arc::new(move |version| template.format(version))
            }
            Self::Function(f) => f.clone(),
        }
    }

    /// The inverse of a template rule, if there is one.
    pub(crate) fn derived_version_fn(&self) -> Option<VersionFn> {
        match self {
            Self::Template(template) => {
                let template = template.clone();
                Some(Arc::new(move |name| template.extract(name)))
            }
            Self::Function(_) => None,
        }
    }
}

impl UrlRule {
    pub fn template(template: &str) -> Result<Self> {
        Ok(Self::Template(Template::new(template)?))
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    pub(crate) fn to_fn(&self) -> NameFn {
        match self {
            Self::Template(template) => {
                let template = template.clone();
                Arc::new(move |version| template.format(version))
            }
            Self::Function(f) => f.clone(),
        }
    }
}

impl fmt::Debug for FilenameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(t) => f.debug_tuple("Template").field(&t.as_str()).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl fmt::Debug for UrlRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(t) => f.debug_tuple("Template").field(&t.as_str()).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Resolved options for one tool.
#[derive(Clone, Default)]
pub struct InstallerOptions {
    /// Filename rule for downloaded versions.
    pub filename: Option<FilenameRule>,
    /// Explicit filename-to-version function.
    pub version: Option<VersionFn>,
    /// URL rule; without it the tool can only be installed from local files.
    pub download_url: Option<UrlRule>,
    /// Grammar applied to versions before naming.
    pub version_fmt: Option<VersionFormat>,
    /// Directory holding downloaded versions.
    pub download_dir: Option<PathBuf>,
    /// Reuse already downloaded files (defaults to `true`).
    pub cache: Option<bool>,
    /// Install routine.
    pub install_fn: Option<InstallFn>,
}

impl InstallerOptions {
    /// Layers `overrides` on top of `self`, field by field.
    pub fn merge(self, overrides: InstallerOptions) -> InstallerOptions {
        InstallerOptions {
            filename: overrides.filename.or(self.filename),
            version: overrides.version.or(self.version),
            download_url: overrides.download_url.or(self.download_url),
            version_fmt: overrides.version_fmt.or(self.version_fmt),
            download_dir: overrides.download_dir.or(self.download_dir),
            cache: overrides.cache.or(self.cache),
            install_fn: overrides.install_fn.or(self.install_fn),
        }
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.filename.is_none()
            && self.version.is_none()
            && self.download_url.is_none()
            && self.version_fmt.is_none()
            && self.download_dir.is_none()
            && self.cache.is_none()
            && self.install_fn.is_none()
    }
}

impl fmt::Debug for InstallerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallerOptions")
            .field("filename", &self.filename)
            .field("version", &self.version.is_some())
            .field("download_url", &self.download_url)
            .field("version_fmt", &self.version_fmt)
            .field("download_dir", &self.download_dir)
            .field("cache", &self.cache)
            .field("install_fn", &self.install_fn.is_some())
            .finish()
    }
}
