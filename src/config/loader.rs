//! Resolution of install function identifiers.
//!
//! Configuration files name install functions with a `path[#exportName]`
//! identifier. An [`InstallFnLoader`] turns a resolved identifier into a
//! callable [`InstallFn`] once, when the configuration is loaded:
//!
//! - [`ScriptLoader`] runs the file at `path` as an executable.
//! - [`InstallFnRegistry`] looks up functions registered at startup.

use crate::error::{Error, Result};
use crate::installer::options::{install_fn, InstallFn};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

/// A parsed `path[#exportName]` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadIdentifier {
    pub path: PathBuf,
    pub export: String,
}

impl LoadIdentifier {
    /// Export used when the identifier names none.
    pub const DEFAULT_EXPORT: &'static str = "default";

    /// Splits `identifier` at its first `#`.
    pub fn parse(identifier: &str) -> Self {
        let (path, export) = match identifier.split_once('#') {
            Some((path, export)) if !export.is_empty() => (path, export),
            Some((path, _)) => (path, Self::DEFAULT_EXPORT),
            None => (identifier, Self::DEFAULT_EXPORT),
        };
        Self {
            path: PathBuf::from(path),
            export: export.to_string(),
        }
    }

    /// Anchors a relative path at `base_dir`.
    pub fn resolve(mut self, base_dir: &Path) -> Self {
        if self.path.is_relative() {
            self.path = base_dir.join(&self.path);
        }
        self
    }

    /// Whether the default export is named.
    pub fn is_default(&self) -> bool {
        self.export == Self::DEFAULT_EXPORT
    }

    fn not_callable(&self, reason: impl Into<String>) -> Error {
        Error::InstallFnNotCallable {
            identifier: self.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LoadIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path.display(), self.export)
    }
}

/// Turns identifiers into install functions.
///
/// Loading runs synchronously while a configuration is resolved on the async
/// runtime, so implementations must be cheap: a metadata lookup or a map
/// access, never network or long-running I/O.
pub trait InstallFnLoader: Send + Sync {
    /// Loads the install function named by an already resolved identifier.
    fn load(&self, identifier: &LoadIdentifier) -> Result<InstallFn>;
}

/// Runs executables as install functions.
///
/// The executable receives the export name (unless it is `default`) followed
/// by the artifact path. A non-zero exit status fails the install.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptLoader;

impl InstallFnLoader for ScriptLoader {
    fn load(&self, identifier: &LoadIdentifier) -> Result<InstallFn> {
        let metadata = std::fs::metadata(&identifier.path)
            .map_err(|e| identifier.not_callable(format!("{} does not exist ({e})", identifier.path.display())))?;
        if !metadata.is_file() {
            return Err(identifier.not_callable("not a file"));
        }
        if !is_executable(&metadata) {
            return Err(identifier.not_callable("not executable"));
        }

        let script = identifier.path.clone();
        let export = (!identifier.is_default()).then(|| identifier.export.clone());
        Ok(install_fn(move |artifact| {
            let script = script.clone();
            let export = export.clone();
            async move {
                debug!("running {:?} on {:?}", script, artifact);
                let mut cmd = Command::new(&script);
                if let Some(export) = export {
                    cmd.arg(export);
                }
                let status = cmd.arg(&artifact).status().await?;
                if status.success() {
                    Ok(())
                } else {
                    Err(Error::InstallScriptFailed {
                        path: script,
                        status,
                    })
                }
            }
        }))
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// Install functions registered ahead of time.
///
/// ```rust
/// use toolstash::config::{InstallFnLoader, InstallFnRegistry, LoadIdentifier};
/// use toolstash::installer::install_fn;
///
/// let registry = InstallFnRegistry::new()
///     .register("/etc/tools/code.sh", "default", install_fn(|_| async { Ok(()) }));
/// assert!(registry.load(&LoadIdentifier::parse("/etc/tools/code.sh")).is_ok());
/// assert!(registry.load(&LoadIdentifier::parse("/etc/tools/code.sh#other")).is_err());
/// ```
#[derive(Clone, Default)]
pub struct InstallFnRegistry {
    functions: HashMap<LoadIdentifier, InstallFn>,
}

impl InstallFnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `f` under `path#export`.
    pub fn register(
        mut self,
        path: impl Into<PathBuf>,
        export: impl Into<String>,
        f: InstallFn,
    ) -> Self {
        let identifier = LoadIdentifier {
            path: path.into(),
            export: export.into(),
        };
        self.functions.insert(identifier, f);
        self
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for InstallFnRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}

impl InstallFnLoader for InstallFnRegistry {
    fn load(&self, identifier: &LoadIdentifier) -> Result<InstallFn> {
        self.functions
            .get(identifier)
            .cloned()
            .ok_or_else(|| identifier.not_callable("no install function registered"))
    }
}

impl<T: InstallFnLoader + ?Sized> InstallFnLoader for Arc<T> {
    fn load(&self, identifier: &LoadIdentifier) -> Result<InstallFn> {
        (**self).load(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier() {
        let id = LoadIdentifier::parse("installers/code.sh#user");
        assert_eq!(id.path, PathBuf::from("installers/code.sh"));
        assert_eq!(id.export, "user");
        assert!(!id.is_default());

        let id = LoadIdentifier::parse("installers/code.sh");
        assert_eq!(id.export, LoadIdentifier::DEFAULT_EXPORT);

        let id = LoadIdentifier::parse("installers/code.sh#");
        assert!(id.is_default());
    }

    #[test]
    fn test_resolve_relative_only() {
        let base = Path::new("/home/me");
        assert_eq!(
            LoadIdentifier::parse("a.sh").resolve(base).path,
            PathBuf::from("/home/me/a.sh")
        );
        assert_eq!(
            LoadIdentifier::parse("/opt/a.sh").resolve(base).path,
            PathBuf::from("/opt/a.sh")
        );
    }

    #[test]
    fn test_script_loader_missing_file() {
        let err = ScriptLoader
            .load(&LoadIdentifier::parse("/definitely/not/here.sh"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::InstallFnNotCallable { .. }));
    }

    #[test]
    fn test_script_loader_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let id = LoadIdentifier::parse(dir.path().to_str().unwrap());
        assert!(matches!(
            ScriptLoader.load(&id),
            Err(Error::InstallFnNotCallable { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_script_loader_rejects_non_executable() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("install.sh");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();
        let id = LoadIdentifier::parse(script.to_str().unwrap());
        assert!(matches!(
            ScriptLoader.load(&id),
            Err(Error::InstallFnNotCallable { .. })
        ));
    }

    #[test]
    fn test_registry_unknown_identifier() {
        let registry = InstallFnRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.load(&LoadIdentifier::parse("/x.sh")),
            Err(Error::InstallFnNotCallable { .. })
        ));
    }
}
