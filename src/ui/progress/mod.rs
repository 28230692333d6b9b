// Sat Jan 17 2026 - Alex

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub struct ProgressManager {
    multi: indicatif::MultiProgress,
    default_style: ProgressStyle,
}

impl ProgressManager {
    pub fn new() -> Self {
        let default_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ ");

        Self {
            multi: indicatif::MultiProgress::new(),
            default_style,
        }
    }

    /// A manager whose bars never draw, for `--no-progress` and `--quiet`.
    pub fn hidden() -> Self {
        let manager = Self::new();
        manager.multi.set_draw_target(ProgressDrawTarget::hidden());
        manager
    }

    pub fn create_main_progress(&self, total: u64, message: &str) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(self.default_style.clone());
        pb.set_message(message.to_string());
        self.multi.add(pb)
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}
