//! Tool configuration resolution.
//!
//! A [`ConfigResolver`] finds the configuration file, turns it into resolved
//! [`InstallerOptions`] per tool and keeps the result for its lifetime. The
//! cache is a single-flight slot: callers that arrive while the first parse
//! is running wait for that parse instead of starting their own.
//!
//! # Examples
//!
//! ```rust,no_run
//! use toolstash::config::{ConfigResolver, ToolConfigRecord};
//!
//! # async fn example() -> toolstash::Result<()> {
//! let resolver = ConfigResolver::new();
//! let overrides = ToolConfigRecord {
//!     cache: Some(false),
//!     ..Default::default()
//! };
//! let installer = resolver.get("code", &overrides, true).await?;
//! installer.download("1.49").await?;
//! # Ok(())
//! # }
//! ```

use super::loader::{InstallFnLoader, LoadIdentifier, ScriptLoader};
use super::module::ModuleLoader;
use super::record::ToolConfigRecord;
use super::source::{self, candidate_dirs, data_extensions, SourceKind, DEFAULT_BASENAME};
use crate::error::{Error, Result};
use crate::format::VersionFormat;
use crate::http::{create_http_client, HttpClientConfig};
use crate::installer::{FilenameRule, Installer, InstallerOptions, UrlRule};
use crate::progress::ProgressBarOpts;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::{fs, sync::OnceCell};
use tracing::{debug, info};

/// Resolved options of every configured tool.
pub type ToolMap = HashMap<String, InstallerOptions>;

/// A loaded configuration file.
#[derive(Debug)]
pub struct ToolConfig {
    path: PathBuf,
    tools: ToolMap,
}

impl ToolConfig {
    /// The file the configuration was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Options of `tool`.
    pub fn get(&self, tool: &str) -> Option<&InstallerOptions> {
        self.tools.get(tool)
    }

    pub fn tools(&self) -> &ToolMap {
        &self.tools
    }
}

type Slot = Arc<OnceCell<Option<Arc<ToolConfig>>>>;

struct Inner {
    dirs: Vec<PathBuf>,
    basename: String,
    extensions: Vec<(String, SourceKind)>,
    loader: Arc<dyn InstallFnLoader>,
    http_config: HttpClientConfig,
    progress: ProgressBarOpts,
    slot: Mutex<Slot>,
}

/// Loads tool configurations and builds installers from them.
///
/// Cloning is cheap and clones share the cache.
#[derive(Clone)]
pub struct ConfigResolver {
    inner: Arc<Inner>,
}

impl fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("dirs", &self.inner.dirs)
            .field("basename", &self.inner.basename)
            .field("extensions", &self.inner.extensions)
            .field("http_config", &self.inner.http_config)
            .finish()
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        ConfigResolverBuilder::new().build()
    }
}

impl ConfigResolver {
    /// A resolver searching the default directories for `toolsrc.*`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ConfigResolverBuilder {
        ConfigResolverBuilder::new()
    }

    /// Directories searched for the configuration file, in order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.inner.dirs
    }

    /// The loaded configuration.
    ///
    /// With `use_cache` the first result is reused; otherwise the file is
    /// searched for and parsed again, replacing the cached result.
    pub async fn options(&self, use_cache: bool) -> Result<Arc<ToolConfig>> {
        let slot = {
            let mut slot = self
                .inner
                .slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !use_cache {
                *slot = Slot::default();
            }
            slot.clone()
        };

        slot.get_or_try_init(|| self.load())
            .await?
            .clone()
            .ok_or(Error::ConfigNotFound)
    }

    /// Sorted names of the configured tools.
    pub async fn tools(&self, use_cache: bool) -> Result<Vec<String>> {
        let config = self.options(use_cache).await?;
        let mut tools: Vec<String> = config.tools.keys().cloned().collect();
        tools.sort();
        Ok(tools)
    }

    /// Path of the configuration file in use.
    pub async fn config_path(&self, use_cache: bool) -> Result<PathBuf> {
        Ok(self.options(use_cache).await?.path.clone())
    }

    /// Builds an installer for `tool` with `overrides` layered on top.
    ///
    /// Relative install function paths in `overrides` resolve against the
    /// current directory. A missing configuration file is not an error here:
    /// the overrides alone may describe the tool.
    pub async fn get(
        &self,
        tool: &str,
        overrides: &ToolConfigRecord,
        use_cache: bool,
    ) -> Result<Installer> {
        let overrides = self.resolve_record(overrides, &std::env::current_dir()?)?;
        self.get_with(tool, overrides, use_cache).await
    }

    /// Like [`get`](Self::get) with already resolved overrides.
    pub async fn get_with(
        &self,
        tool: &str,
        overrides: InstallerOptions,
        use_cache: bool,
    ) -> Result<Installer> {
        let base = match self.options(use_cache).await {
            Ok(config) => config.tools.get(tool).cloned(),
            Err(Error::ConfigNotFound) => None,
            Err(e) => return Err(e),
        };

        let options = match base {
            Some(base) => base.merge(overrides),
            None => overrides,
        };
        if options.filename.is_none() {
            return Err(Error::ToolNotConfigured(tool.to_string()));
        }

        let client = create_http_client(self.inner.http_config.clone())?;
        Installer::with_transport(options, client, self.inner.progress.clone())
    }

    /// Compiles a record's templates and loads its install function.
    ///
    /// Relative install function paths resolve against `base_dir`.
    pub fn resolve_record(
        &self,
        record: &ToolConfigRecord,
        base_dir: &Path,
    ) -> Result<InstallerOptions> {
        let install_fn = match &record.install_fn {
            Some(identifier) => {
                let identifier = LoadIdentifier::parse(identifier).resolve(base_dir);
                Some(self.inner.loader.load(&identifier)?)
            }
            None => None,
        };

        Ok(InstallerOptions {
            filename: record
                .filename
                .as_deref()
                .map(FilenameRule::template)
                .transpose()?,
            version: None,
            download_url: record
                .download_url
                .as_deref()
                .map(UrlRule::template)
                .transpose()?,
            version_fmt: record
                .version_fmt
                .as_deref()
                .map(VersionFormat::new)
                .transpose()?,
            download_dir: record.download_dir.clone(),
            cache: record.cache,
            install_fn,
        })
    }

    async fn load(&self) -> Result<Option<Arc<ToolConfig>>> {
        let Some(source) =
            source::find(&self.inner.dirs, &self.inner.basename, &self.inner.extensions).await
        else {
            debug!(
                "no {}.* found in {:?}",
                self.inner.basename, self.inner.dirs
            );
            return Ok(None);
        };

        info!("loading tool configuration from {:?}", source.path);
        let tools = match &source.kind {
            SourceKind::Data(format) => {
                let text = fs::read_to_string(&source.path).await?;
                let records = format.parse(&text).map_err(|reason| Error::InvalidConfig {
                    path: source.path.clone(),
                    reason,
                })?;

                let mut tools = ToolMap::with_capacity(records.len());
                for (tool, record) in &records {
                    tools.insert(tool.clone(), self.resolve_record(record, &source.dir)?);
                }
                tools
            }
            SourceKind::Module(module) => module.load(&source.path)?,
        };
        debug!("configured tools: {:?}", tools.keys().collect::<Vec<_>>());

        Ok(Some(Arc::new(ToolConfig {
            path: source.path,
            tools,
        })))
    }
}

/// A builder used to create a [`ConfigResolver`].
///
/// ```rust
/// use toolstash::config::{ConfigResolver, StaticModule};
///
/// let resolver = ConfigResolver::builder()
///     .dirs(vec!["/etc/tools".into()])
///     .basename("tools")
///     .module("mod", StaticModule::new())
///     .build();
/// assert_eq!(resolver.dirs().len(), 1);
/// ```
pub struct ConfigResolverBuilder {
    dirs: Option<Vec<PathBuf>>,
    basename: String,
    modules: Vec<(String, SourceKind)>,
    loader: Arc<dyn InstallFnLoader>,
    http_config: HttpClientConfig,
    progress: ProgressBarOpts,
}

impl Default for ConfigResolverBuilder {
    fn default() -> Self {
        Self {
            dirs: None,
            basename: DEFAULT_BASENAME.to_string(),
            modules: Vec::new(),
            loader: Arc::new(ScriptLoader),
            http_config: HttpClientConfig::default(),
            progress: ProgressBarOpts::default(),
        }
    }
}

impl ConfigResolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the searched directories.
    pub fn dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.dirs = Some(dirs);
        self
    }

    /// Sets the configuration file name without extension.
    pub fn basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = basename.into();
        self
    }

    /// Serves `<basename>.<ext>` with `module`.
    ///
    /// Module extensions are tried after the structured-data ones, in
    /// registration order.
    pub fn module(mut self, ext: impl Into<String>, module: impl ModuleLoader + 'static) -> Self {
        self.modules
            .push((ext.into(), SourceKind::Module(Arc::new(module))));
        self
    }

    /// Sets how install function identifiers are loaded.
    pub fn install_fn_loader(mut self, loader: impl InstallFnLoader + 'static) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    /// Configures the HTTP client of built installers.
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Set the progress bar options of built installers.
    pub fn progress(mut self, progress: ProgressBarOpts) -> Self {
        self.progress = progress;
        self
    }

    pub fn build(self) -> ConfigResolver {
        let mut extensions = data_extensions();
        extensions.extend(self.modules);

        ConfigResolver {
            inner: Arc::new(Inner {
                dirs: self.dirs.unwrap_or_else(candidate_dirs),
                basename: self.basename,
                extensions,
                loader: self.loader,
                http_config: self.http_config,
                progress: self.progress,
                slot: Mutex::new(Slot::default()),
            }),
        }
    }
}
