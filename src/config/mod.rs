//! Tool configuration: finding, parsing and resolving it.
//!
//! - [`record`] - records as written in YAML, TOML or JSON files
//! - [`source`] - the directory and extension search
//! - [`loader`] - install function identifiers and their loaders
//! - [`module`] - executable-module sources with live functions
//! - [`resolver`] - [`ConfigResolver`], which ties the above together and
//!   builds installers

pub mod loader;
pub mod module;
pub mod record;
pub mod resolver;
pub mod source;

pub use loader::{InstallFnLoader, InstallFnRegistry, LoadIdentifier, ScriptLoader};
pub use module::{ModuleLoader, StaticModule};
pub use record::{DataFormat, ToolConfigMap, ToolConfigRecord};
pub use resolver::{ConfigResolver, ConfigResolverBuilder, ToolConfig, ToolMap};
pub use source::{ConfigSource, SourceKind, DEFAULT_BASENAME};
