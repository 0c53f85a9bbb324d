//! Progress reporting for artifact transfers.
//!
//! - `style` - progress bar templates and visibility
//! - `display` - the bar driven while one artifact is fetched
//!
//! ```rust
//! use toolstash::progress::ProgressBarOpts;
//!
//! // Quiet transfers, e.g. in tests or non-interactive shells.
//! let opts = ProgressBarOpts::hidden();
//! assert!(!opts.is_enabled());
//! ```

pub(crate) mod display;
pub(crate) mod style;

pub use display::ProgressDisplay;
pub use style::ProgressBarOpts;
