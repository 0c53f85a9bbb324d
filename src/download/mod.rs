//! Materializing versions as local files.
//!
//! - [`cache`] - the cache-hit decision, the HTTP fetch and the atomic write
//!
//! A [`DownloadCache`] is normally built by an
//! [`Installer`](crate::installer::Installer); it is exposed for callers that
//! only need the fetch-and-store half.

pub mod cache;

pub use cache::DownloadCache;
