// Error taxonomy for the watch loop.
// Selection cancel and tracking loss are deliberately NOT here: cancel is an
// `Option::None` from the selector, loss is an alert condition the evaluator
// handles every frame.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The capture device could not be opened. Fatal before the loop starts.
    #[error("cannot open camera (index {index}): {reason}")]
    CameraOpen { index: u32, reason: String },

    /// A frame read or decode failed mid-run. Fatal; the loop exits.
    #[error("camera frame error: {0}")]
    CameraRead(String),

    #[error("window init error: {0}")]
    WindowInit(String),

    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// Snapshot encoding failed.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] image::ImageError),

    /// Snapshot directory creation or file I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
