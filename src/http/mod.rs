//! HTTP client used to fetch artifacts.
//!
//! - [`client`] - client creation and middleware configuration
//!
//! ```rust
//! use toolstash::http::{create_http_client, HttpClientConfig};
//!
//! let client = create_http_client(HttpClientConfig::default())?;
//! # Ok::<(), reqwest::Error>(())
//! ```

pub mod client;

pub use client::{create_http_client, HttpClientConfig};
