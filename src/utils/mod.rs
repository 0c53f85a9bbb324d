//! Shared utility functions.
//!
//! - [`path`] - normalization of configured directories
//! - [`content_length`] - expected body size of an HTTP response

pub mod content_length;
pub mod path;

pub use content_length::{expected_size, parse_content_range_total};
pub use path::{absolutize, expand_home};
