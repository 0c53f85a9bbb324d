//! Tool configuration records as written in structured configuration files.
//!
//! A file maps tool names to records. YAML, TOML and JSON share one shape:
//!
//! ```yaml
//! code:
//!   filename: code-%s.tar.gz
//!   downloadURL: https://update.code.visualstudio.com/%s/linux-x64/stable
//!   versionFmt: "#.#"
//!   downloadDir: ~/.cache/tools/code
//!   installFn: installers/code.sh
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One tool's configuration before resolution.
///
/// Rules are still template strings and the install function is still a
/// `path[#exportName]` identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToolConfigRecord {
    /// Filename template; the first `%s` is replaced with the version.
    #[serde(alias = "filenameFmt")]
    pub filename: Option<String>,
    /// Download URL template; the first `%s` is replaced with the version.
    #[serde(rename = "downloadURL", alias = "downloadUrl", alias = "downloadURLFmt")]
    pub download_url: Option<String>,
    /// Strict version grammar where `#` marks a numeric component.
    pub version_fmt: Option<String>,
    /// Directory for downloaded versions.
    pub download_dir: Option<PathBuf>,
    /// Reuse downloaded files.
    pub cache: Option<bool>,
    /// Install function identifier, `path[#exportName]`.
    pub install_fn: Option<String>,
}

impl ToolConfigRecord {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parsed configuration file, keyed by tool name.
pub type ToolConfigMap = BTreeMap<String, ToolConfigRecord>;

/// Structured data formats a configuration file may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Yaml,
    Toml,
    Json,
}

impl DataFormat {
    /// Parses the text of a configuration file.
    ///
    /// An empty file configures no tools. A tool key without a value (YAML
    /// `tool:`, JSON `null`) yields an empty record.
    pub fn parse(self, text: &str) -> Result<ToolConfigMap, String> {
        if text.trim().is_empty() {
            return Ok(ToolConfigMap::new());
        }

        let raw: BTreeMap<String, Option<ToolConfigRecord>> = match self {
            DataFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string())?,
            DataFormat::Toml => toml::from_str(text).map_err(|e| e.to_string())?,
            DataFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string())?,
        };
        Ok(raw
            .into_iter()
            .map(|(tool, record)| (tool, record.unwrap_or_default()))
            .collect())
    }
}
