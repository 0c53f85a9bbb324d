//! Locating the configuration file.
//!
//! Directories are searched in order and, within each directory, extensions
//! are tried in order. The first existing `<basename>.<ext>` wins; files are
//! never merged.

use super::module::ModuleLoader;
use super::record::DataFormat;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

/// Default configuration basename.
pub const DEFAULT_BASENAME: &str = "toolsrc";

/// How a configuration file is interpreted.
#[derive(Clone)]
pub enum SourceKind {
    /// Declarative records.
    Data(DataFormat),
    /// Executable module with live functions.
    Module(Arc<dyn ModuleLoader>),
}

impl fmt::Debug for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(format) => f.debug_tuple("Data").field(format).finish(),
            Self::Module(_) => f.write_str("Module(..)"),
        }
    }
}

/// Structured-data extensions, in search order.
pub fn data_extensions() -> Vec<(String, SourceKind)> {
    [
        ("yml", DataFormat::Yaml),
        ("yaml", DataFormat::Yaml),
        ("toml", DataFormat::Toml),
        ("json", DataFormat::Json),
    ]
    .into_iter()
    .map(|(ext, format)| (ext.to_string(), SourceKind::Data(format)))
    .collect()
}

/// A configuration file that was found.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Directory containing the file; relative identifiers resolve here.
    pub dir: PathBuf,
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Current directory, home directory and the directory of the running
/// executable, without duplicates.
pub fn candidate_dirs() -> Vec<PathBuf> {
    let install_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in [std::env::current_dir().ok(), dirs::home_dir(), install_dir]
        .into_iter()
        .flatten()
    {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

/// Returns the first existing candidate.
pub async fn find(
    dirs: &[PathBuf],
    basename: &str,
    extensions: &[(String, SourceKind)],
) -> Option<ConfigSource> {
    for dir in dirs {
        for (ext, kind) in extensions {
            let path = dir.join(format!("{basename}.{ext}"));
            let is_file = fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if is_file {
                debug!("found configuration {:?}", path);
                return Some(ConfigSource {
                    dir: dir.clone(),
                    path,
                    kind: kind.clone(),
                });
            }
        }
    }
    None
}
