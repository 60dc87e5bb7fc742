use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use occucube_core::TaxonKey;
use occucube_cube::LookupProgress;
use std::time::Duration;

pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Lookup progress bar; its length grows as each bucket queues keys
pub struct LookupBar {
    bar: ProgressBar,
}

impl LookupBar {
    pub fn new(visible: bool) -> Self {
        let bar = ProgressBar::new(0);
        if !visible {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} taxa resolved")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl LookupProgress for LookupBar {
    fn queued(&self, count: usize) {
        self.bar.inc_length(count as u64);
    }

    fn resolved(&self, _key: TaxonKey) {
        self.bar.inc(1);
    }
}
