//! Executable-module configuration sources.
//!
//! A module supplies fully built [`InstallerOptions`] (live functions
//! included) for each tool it knows about. Modules are registered on a
//! [`ConfigResolver`](crate::config::ConfigResolver) for a file extension; a
//! `toolsrc.<ext>` file with that extension then selects the module.

use crate::error::Result;
use crate::installer::InstallerOptions;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Loads tool options from an executable-module configuration file.
pub trait ModuleLoader: Send + Sync {
    /// Produces the options of every tool exported by the module at `path`.
    fn load(&self, path: &Path) -> Result<HashMap<String, InstallerOptions>>;
}

/// A module compiled into the program.
///
/// The configuration file only selects the module; its contents are ignored.
///
/// ```rust
/// use toolstash::config::StaticModule;
/// use toolstash::installer::{FilenameRule, InstallerOptions};
///
/// let module = StaticModule::new().tool(
///     "code",
///     InstallerOptions {
///         filename: Some(FilenameRule::function(|v| format!("code-{v}.tar.gz"))),
///         ..Default::default()
///     },
/// );
/// assert_eq!(module.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct StaticModule {
    tools: HashMap<String, InstallerOptions>,
}

impl StaticModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exports `options` under `name`.
    pub fn tool(mut self, name: impl Into<String>, options: InstallerOptions) -> Self {
        self.tools.insert(name.into(), options);
        self
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for StaticModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticModule")
            .field("tools", &self.tools)
            .finish()
    }
}

impl ModuleLoader for StaticModule {
    fn load(&self, _path: &Path) -> Result<HashMap<String, InstallerOptions>> {
        Ok(self.tools.clone())
    }
}
