// Run configuration, fixed at process start.
// The defaults mirror the constants the tool has always shipped with; flags
// exist so a different camera or directory doesn't require a rebuild.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Requested capture size. The camera may pick the closest mode it supports;
/// whatever it actually delivers wins.
pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "watchpost",
    about = "Watches a selected region of a webcam feed and alerts when the object moves or disappears"
)]
pub struct Config {
    /// Capture device index (0 = default webcam).
    #[arg(long, default_value_t = 0)]
    pub camera_index: u32,

    /// Minimum seconds between two recorded alerts (log line + snapshot).
    #[arg(long, default_value_t = 5.0)]
    pub cooldown_secs: f64,

    /// How many pixels the tracked center may drift before an alert.
    #[arg(long, default_value_t = 40.0)]
    pub move_threshold: f64,

    /// Directory where alert snapshots are written.
    #[arg(long, default_value = "snapshots")]
    pub snapshot_dir: PathBuf,
}

impl Config {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.cooldown_secs)
    }
}
