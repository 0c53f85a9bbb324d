//! Printf-style `%s` templates.
//!
//! A [`Template`] turns a version into a filename or URL by replacing the first
//! `%s` token, and can run the other way: given a filename, recover the text
//! that stood in for `%s`.
//!
//! # Examples
//!
//! ```rust
//! use toolstash::format::Template;
//!
//! let template = Template::new("code-%s.tar.gz")?;
//! assert_eq!(template.format("1.49"), "code-1.49.tar.gz");
//! assert_eq!(template.extract("code-1.49.tar.gz").as_deref(), Some("1.49"));
//! assert_eq!(template.extract("readme.txt"), None);
//! # Ok::<(), toolstash::Error>(())
//! ```

use crate::error::Result;

use regex::Regex;
use std::fmt;

/// The placeholder substituted with a version.
pub const PLACEHOLDER: &str = "%s";

/// A template with at most one meaningful `%s` placeholder.
#[derive(Clone)]
pub struct Template {
    source: String,
    extractor: Option<Regex>,
}

impl Template {
    /// Compiles a template and its inverse extractor.
    ///
    /// Literal text around the placeholder is escaped before it is spliced
    /// into the extractor pattern. A template without `%s` is entirely
    /// literal and never yields a version.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let extractor = match source.split_once(PLACEHOLDER) {
            Some((prefix, suffix)) => Some(Regex::new(&format!(
                "^{}(.+){}$",
                regex::escape(prefix),
                regex::escape(suffix)
            ))?),
            None => None,
        };
        Ok(Self { source, extractor })
    }

    /// The raw template text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the template contains a placeholder.
    pub fn has_placeholder(&self) -> bool {
        self.extractor.is_some()
    }

    /// Replaces the first `%s` with `version`.
    pub fn format(&self, version: &str) -> String {
        self.source.replacen(PLACEHOLDER, version, 1)
    }

    /// Recovers the version from a formatted name.
    ///
    /// Returns `None` when the name does not fit the template or leaves
    /// nothing in place of `%s`.
    pub fn extract(&self, name: &str) -> Option<String> {
        self.extractor
            .as_ref()?
            .captures(name)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Template").field(&self.source).finish()
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
