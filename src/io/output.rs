//! Tracing subscriber setup for the demo and other binaries

use std::fmt;
use std::fs::File;
use std::time::SystemTime as StdSystemTime;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Wall-clock timestamps at second precision
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let duration = StdSystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Route log output to `output_path`, or to stdout when `None`
///
/// A second call is a no-op, so tests and binaries may both call it.
pub fn setup_output(output_path: Option<&str>) {
    match output_path.map(|path| (path, File::create(path))) {
        Some((path, Ok(log))) => {
            let file_layer = layer()
                .with_writer(log)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(false);
            if Registry::default().with(file_layer).try_init().is_ok() {
                info!("Output will be written to: {}", path);
            }
        }
        Some((path, Err(err))) => {
            eprintln!("Could not create output file {}: {}", path, err);
            init_stdout();
            warn!("Falling back to stdout");
        }
        None => {
            init_stdout();
        }
    }
}

fn init_stdout() {
    let stdout_layer = layer()
        .with_writer(std::io::stdout)
        .with_timer(SecondPrecisionTimer)
        .with_ansi(true);
    if Registry::default().with(stdout_layer).try_init().is_ok() {
        info!("Output will be printed to stdout");
    }
}
