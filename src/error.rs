//! Error handling for the toolstash library.
//!
//! Every failure in the crate surfaces through the [`Error`] enum. None of
//! these conditions are retried or swallowed by the library: they are returned
//! to the direct caller, which decides how to report them.

use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can happen when using toolstash.
#[derive(Error, Debug)]
pub enum Error {
    /// No configuration file was found in any candidate directory.
    #[error("no configuration file found")]
    ConfigNotFound,

    /// A configuration file was found but could not be parsed.
    #[error("invalid configuration {path:?}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    /// Neither the configuration nor the overrides describe the tool.
    #[error("could not get installer options for {0}")]
    ToolNotConfigured(String),

    /// A required option is absent.
    #[error("{0} not defined")]
    MissingField(&'static str),

    /// A `versionFmt` string that contains no `#` slot.
    #[error("invalid version format {0:?}: expected at least one `#`")]
    InvalidVersionFormat(String),

    /// The tool has no `downloadURL` rule.
    #[error("downloadURL not defined")]
    DownloadUrlUndefined,

    /// The server answered with a non-success status.
    #[error("{url} {} ({})", .status.canonical_reason().unwrap_or("unknown status").to_lowercase(), .status.as_u16())]
    HttpStatus { url: String, status: StatusCode },

    /// The tool has no install function.
    #[error("installFn undefined")]
    InstallFnUndefined,

    /// An install function identifier did not resolve to something callable.
    #[error("{identifier} is not callable: {reason}")]
    InstallFnNotCallable { identifier: String, reason: String },

    /// An install script ran but reported failure.
    #[error("install script {path:?} failed with {status}")]
    InstallScriptFailed { path: PathBuf, status: ExitStatus },

    /// No version was given and none are downloaded.
    #[error("no versions downloaded")]
    VersionNotFound,

    /// The version is not available locally and downloading is disabled.
    #[error("{0} could not be found")]
    FileNotFoundOffline(String),

    /// The download finished without leaving a file to install.
    #[error("could not download and install {0}")]
    DownloadInstallFailed(String),

    /// A generated pattern failed to compile.
    #[error("Regex error")]
    Regex {
        #[from]
        source: regex::Error,
    },

    /// Error from an underlying system.
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O Error.
    #[error("I/O error")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error raised by the HTTP middleware stack.
    #[error("HTTP middleware error")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },
}

/// Result type alias for operations that can fail with a toolstash error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_message_mentions_url_and_code() {
        let err = Error::HttpStatus {
            url: "https://example.test/1.0/demo.bin".into(),
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(
            err.to_string(),
            "https://example.test/1.0/demo.bin not found (404)"
        );
    }

    #[test]
    fn offline_message_names_version() {
        let err = Error::FileNotFoundOffline("1.2.3".into());
        assert_eq!(err.to_string(), "1.2.3 could not be found");
    }
}
