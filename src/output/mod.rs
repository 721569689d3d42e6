mod progress;
mod render;
mod styling;
mod tables;
mod time;

pub use progress::Spinner;
pub use render::{
    render_build, render_builders, render_builds, render_log, render_names, render_steps,
    render_workers, StepRow,
};
pub use styling::{dim, magenta_bold};
pub use time::now;

/// Prints the buildview banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🛠 buildview"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Buildbot pipeline viewer")
    );
}
