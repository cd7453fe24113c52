//! Progress reporting for batch operations.
//!
//! Thin wrapper over `indicatif` so library code can report progress
//! without caring whether a terminal is attached; automation paths get
//! the hidden variant and pay nothing.

use indicatif::{ProgressBar, ProgressStyle};

/// A progress bar or a no-op, chosen by the caller.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Visible bar sized for `len` items.
    pub fn bar(len: u64) -> Self {
        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
        );
        Self { bar }
    }

    /// Reporter that renders nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Advances by one item.
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Resizes the bar once the item count is known.
    pub fn set_length(&self, len: u64) {
        self.bar.set_length(len);
    }

    /// Sets the trailing message.
    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    /// Finishes and clears the bar.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
