// file: src/pipeline/progress.rs
// description: progress tracking for per-project enhancement calls
// reference: uses indicatif for progress bars and tracks enhancement counts

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnhancementStats {
    pub enhanced: usize,
    pub unchanged: usize,
    pub duration_secs: u64,
}

impl EnhancementStats {
    pub fn total(&self) -> usize {
        self.enhanced + self.unchanged
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.enhanced as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    enhanced: Arc<AtomicUsize>,
    unchanged: Arc<AtomicUsize>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self::with_color(total, true)
    }

    pub fn with_color(total: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();
        let main_bar = create_progress_bar(&multi_progress, total as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);
        Self::from_bars(main_bar, detail_bar)
    }

    /// Tracker that counts without drawing; used when output is not a terminal.
    pub fn hidden(total: usize) -> Self {
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let main_bar = multi_progress.add(ProgressBar::new(total as u64));
        let detail_bar = multi_progress.add(ProgressBar::new(0));
        Self::from_bars(main_bar, detail_bar)
    }

    fn from_bars(main_bar: ProgressBar, detail_bar: ProgressBar) -> Self {
        Self {
            main_bar,
            detail_bar,
            enhanced: Arc::new(AtomicUsize::new(0)),
            unchanged: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_enhanced(&self) {
        self.enhanced.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_unchanged(&self) {
        self.unchanged.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.detail_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Enhancement complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> EnhancementStats {
        EnhancementStats {
            enhanced: self.enhanced.load(Ordering::SeqCst),
            unchanged: self.unchanged.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let enhanced = self.enhanced.load(Ordering::SeqCst);
        let unchanged = self.unchanged.load(Ordering::SeqCst);
        self.detail_bar
            .set_message(format!("Enhanced: {} | Unchanged: {}", enhanced, unchanged));
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let (template, chars) = if colored {
        (
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            "█▓▒░",
        )
    } else {
        (
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}",
            "=>-",
        )
    };

    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        bar.set_style(style.progress_chars(chars));
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    if let Ok(style) = ProgressStyle::default_bar().template("{msg}") {
        bar.set_style(style);
    }
    bar
}
