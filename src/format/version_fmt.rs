//! Strict version grammar.
//!
//! A `versionFmt` such as `v#.#.#` describes a version as literal tokens
//! around numeric slots (`#`). Raw versions may supply fewer components than
//! the grammar has slots; normalization pads the missing trailing slots with
//! `0`, so `5`, `5.0` and `v5.0.0` all become `v5.0.0`.
//!
//! ```rust
//! use toolstash::format::VersionFormat;
//!
//! let fmt = VersionFormat::new("v#.#.#")?;
//! assert_eq!(fmt.normalize("5"), "v5.0.0");
//! assert_eq!(fmt.normalize("5.1"), "v5.1.0");
//! # Ok::<(), toolstash::Error>(())
//! ```

use crate::error::{Error, Result};

use regex::Regex;
use std::fmt;

/// The character marking a numeric slot.
pub const SLOT: char = '#';

/// A compiled `versionFmt` grammar.
#[derive(Clone)]
pub struct VersionFormat {
    source: String,
    /// Literal tokens; there is always one more token than slots.
    tokens: Vec<String>,
    regex: Regex,
}

impl VersionFormat {
    /// Compiles a grammar.
    ///
    /// The first slot is required, every later slot is optional. Leading and
    /// trailing literals are optional in the input but always emitted.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let tokens: Vec<String> = source.split(SLOT).map(String::from).collect();
        if tokens.len() < 2 {
            return Err(Error::InvalidVersionFormat(source));
        }

        let last = tokens.len() - 1;
        let mut pattern = format!("^(?:{})?(\\d+)", regex::escape(&tokens[0]));
        for token in &tokens[1..last] {
            if token.is_empty() {
                pattern.push_str("(\\d+)?");
            } else {
                pattern.push_str(&format!("(?:{}(\\d+))?", regex::escape(token)));
            }
        }
        if !tokens[last].is_empty() {
            pattern.push_str(&format!("(?:{})?", regex::escape(&tokens[last])));
        }
        pattern.push('$');

        Ok(Self {
            regex: Regex::new(&pattern)?,
            source,
            tokens,
        })
    }

    /// The raw grammar text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of numeric slots.
    pub fn slots(&self) -> usize {
        self.tokens.len() - 1
    }

    /// Rewrites `version` into its canonical form.
    ///
    /// A version that does not fit the grammar is returned unchanged.
    pub fn normalize(&self, version: &str) -> String {
        let Some(captures) = self.regex.captures(version) else {
            return version.to_string();
        };

        let mut normalized = String::with_capacity(version.len() + self.source.len());
        for (slot, token) in self.tokens[..self.slots()].iter().enumerate() {
            normalized.push_str(token);
            normalized.push_str(captures.get(slot + 1).map_or("0", |m| m.as_str()));
        }
        normalized.push_str(&self.tokens[self.slots()]);
        normalized
    }
}

impl fmt::Debug for VersionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VersionFormat").field(&self.source).finish()
    }
}
