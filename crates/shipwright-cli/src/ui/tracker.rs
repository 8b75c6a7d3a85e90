use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use shipwright_http::Progress;

const PB_STYLE: &str =
    "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Terminal progress bar fed by download progress reports.
///
/// Cheap to clone; clones drive the same bar.
#[derive(Clone)]
pub struct ProgressTracker {
    pb: ProgressBar,
}

impl ProgressTracker {
    pub fn new(prefix: &str) -> Self {
        let pb = ProgressBar::new(0);
        let pb = match PB_TEMPLATE.as_ref() {
            Some(style) => pb.with_style(style.clone()),
            None => pb,
        };
        pb.set_prefix(prefix.to_string());
        Self { pb }
    }

    pub fn update(&self, progress: &Progress) {
        if self.pb.length() != Some(progress.total) {
            self.pb.set_length(progress.total);
        }
        self.pb.set_position(progress.transferred);
        self.pb.set_message(format!("{:.0}%", progress.percent()));
    }

    pub fn finish(&self, msg: &str) { self.pb.finish_with_message(msg.to_string()); }

    pub fn abandon(&self) { self.pb.abandon(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    fn hidden_tracker() -> ProgressTracker {
        let tracker = ProgressTracker::new("Downloading");
        tracker.pb.set_draw_target(ProgressDrawTarget::hidden());
        tracker
    }

    #[test]
    fn test_template_shows_message() {
        assert!(PB_TEMPLATE.is_some());
        assert!(PB_STYLE.contains("{msg}"));
    }

    #[test]
    fn test_update_tracks_position_and_percent() {
        let tracker = hidden_tracker();
        tracker.update(&Progress {
            total:            200,
            transferred:      50,
            delta:            50,
            bytes_per_second: 10,
        });

        assert_eq!(tracker.pb.length(), Some(200));
        assert_eq!(tracker.pb.position(), 50);
        assert_eq!(tracker.pb.message(), "25%");
    }

    #[test]
    fn test_finish_keeps_message() {
        let tracker = hidden_tracker();
        tracker.finish("done");

        assert!(tracker.pb.is_finished());
        assert_eq!(tracker.pb.message(), "done");
    }
}
