use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright_green, bright_yellow};

/// Spinner shown on stderr while requests are outstanding.
///
/// Cleared on drop unless finished, so an early `?` return leaves no line behind.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
            pb.set_style(style);
        }
        pb.set_message(bright_yellow(message).to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(self, message: &str) {
        self.pb
            .finish_with_message(bright_green(format!("{message} ✓")).to_string());
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_spinner_is_cleared() {
        let spinner = Spinner::start("Fetching builds");
        let pb = spinner.pb.clone();
        assert!(!pb.is_finished());

        drop(spinner);

        assert!(pb.is_finished());
    }

    #[test]
    fn test_finished_spinner_keeps_message() {
        let spinner = Spinner::start("Fetching builds");
        let pb = spinner.pb.clone();

        spinner.finish("Fetched builds");

        assert!(pb.is_finished());
        assert!(pb.message().contains("Fetched builds"));
    }
}
