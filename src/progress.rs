// src/progress.rs
// =============================================================================
// Progress reporting for long-running passes.
//
// The crawler, the sitemap resolver and the scan pass call a ProgressSink
// after each unit of work. The library never draws anything itself: the CLI
// plugs in an indicatif progress bar, tests plug in a closure that records
// the updates, and library users who don't care pass `Silent`.
// =============================================================================

use indicatif::{ProgressBar, ProgressStyle};

/// Which pass an update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sitemap,
    Crawl,
    Scan,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Sitemap => "sitemap",
            Stage::Crawl => "crawl",
            Stage::Scan => "scan",
        }
    }
}

/// One step of progress: `current` out of `total` units in `stage`.
///
/// For the sitemap pass `total` grows as nested sitemaps are discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub stage: Stage,
    pub current: usize,
    pub total: usize,
    pub url: String,
}

pub trait ProgressSink: Send + Sync {
    fn update(&self, update: ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn update(&self, update: ProgressUpdate) {
        self(update)
    }
}

/// Ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressSink for Silent {
    fn update(&self, _update: ProgressUpdate) {}
}

/// Terminal progress bar, one bar reused across all passes.
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template("{prefix:>8} [{bar:30}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn update(&self, update: ProgressUpdate) {
        self.bar.set_prefix(update.stage.label());
        self.bar.set_length(update.total as u64);
        self.bar.set_position(update.current as u64);
        self.bar.set_message(update.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_is_a_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |update: ProgressUpdate| seen.lock().unwrap().push(update.current);

        let sink_ref: &dyn ProgressSink = &sink;
        for current in 1..=3 {
            sink_ref.update(ProgressUpdate {
                stage: Stage::Scan,
                current,
                total: 3,
                url: String::new(),
            });
        }

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }
}
