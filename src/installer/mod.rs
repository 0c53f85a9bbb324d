//! Installer options and the installer orchestrator.
//!
//! - `options` - resolved per-tool rules ([`InstallerOptions`])
//! - `builder` - [`InstallerBuilder`] for direct construction
//! - `installer` - [`Installer`] with `download`, `install`, `downloaded`
//!   and `latest`
//!
//! Installers for configured tools are usually obtained through
//! [`ConfigResolver::get`](crate::config::ConfigResolver::get).

pub mod builder;
pub mod installer;
pub mod options;

pub use builder::InstallerBuilder;
pub use installer::Installer;
pub use options::{
    install_fn, FilenameRule, InstallFn, InstallerOptions, NameFn, UrlRule, VersionFn,
};
