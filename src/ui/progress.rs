//! Build spinner with CI fallback

use super::context::UiContext;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Spinner shown on stderr while a script compiles.
///
/// Silent outside interactive terminals so piped output stays clean.
pub struct BuildSpinner {
    bar: Option<ProgressBar>,
}

impl BuildSpinner {
    /// A spinner that draws nothing until [`start`](Self::start) is called
    pub fn new(ctx: &UiContext) -> Self {
        let bar = ctx.use_fancy_output().then(|| {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
            );
            bar
        });
        Self { bar }
    }

    /// Start spinning with a message
    pub fn start(&self, message: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(message.to_string());
            bar.enable_steady_tick(Duration::from_millis(100));
        }
    }

    /// Clear the spinner; the script's own output follows
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Drop for BuildSpinner {
    fn drop(&mut self) {
        self.finish();
    }
}
