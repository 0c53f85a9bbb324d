//! Conversion between version strings, filenames and URLs.
//!
//! - [`template`] - `%s` templates and their inverse extractors
//! - [`version_fmt`] - the strict `#` grammar used to canonicalize versions
//!
//! Both are pure: they compile user-supplied text into patterns once and
//! never touch the filesystem or network.

pub mod template;
pub mod version_fmt;

pub use template::Template;
pub use version_fmt::VersionFormat;
