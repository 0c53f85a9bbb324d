//! The progress bar shown while one artifact is fetched.

use crate::progress::ProgressBarOpts;

use indicatif::ProgressBar;

/// Wraps the bar of a single transfer.
pub struct ProgressDisplay {
    bar: ProgressBar,
    clear: bool,
}

impl ProgressDisplay {
    /// Starts a bar for a transfer of `len` bytes, labelled with `message`.
    pub fn new(opts: &ProgressBarOpts, len: Option<u64>, message: impl Into<String>) -> Self {
        let bar = opts.to_progress_bar(len);
        bar.set_message(message.into());
        Self {
            bar,
            clear: opts.clear,
        }
    }

    /// Advances the bar by `bytes`.
    pub fn inc(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    /// Bytes reported so far.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finishes the bar, clearing it if configured to.
    pub fn finish(self) {
        if self.clear {
            self.bar.finish_and_clear();
        } else {
            self.bar.finish();
        }
    }

    /// Abandons the bar after a failed transfer.
    pub fn abandon(self) {
        self.bar.abandon();
    }
}
