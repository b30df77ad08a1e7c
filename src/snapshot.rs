// Alert snapshot persistence: one JPEG per recorded alert, named by the
// alert's wall-clock timestamp. Sub-second collisions overwrite; accepted.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::Error;
use crate::types::FrameBuffer;

/// Write the (annotated) frame as `alert_<YYYY-MM-DD_HH-MM-SS>.jpg` under
/// `dir`, creating the directory if needed. Returns the written path.
pub fn save_snapshot(frame: &FrameBuffer, dir: &Path) -> Result<PathBuf, Error> {
    fs::create_dir_all(dir)?;
    let ts = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = dir.join(format!("alert_{ts}.jpg"));
    frame.to_rgb_image().save(&path)?;
    Ok(path)
}
