//! CLI-specific progress handling for piste-osm
//!
//! Provides the feature progress bar for the command-line interface.

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar counting translated features
pub fn create_progress_bar(total_features: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_features);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} features ({percent}%) ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Progress manager for a conversion run
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_features: u64, message: &str) -> Self {
        let pb = create_progress_bar(total_features);

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    /// Callback suitable for `ConvertOptions::progress`
    pub fn callback(&self) -> piste_osm::pipeline::ProgressCallback {
        let pb = self.pb.clone();
        std::sync::Arc::new(move |processed, total| {
            if pb.length().unwrap_or(0) != total {
                pb.set_length(total);
            }
            pb.set_position(processed);
            if processed >= total {
                pb.finish_with_message("done");
            }
        })
    }
}
