// Capture device access. Opens a camera by index, pulls RGB frames and packs
// them into the 0x00RRGGBB buffer the window layer displays.

use crate::error::Error;
use crate::types::FrameBuffer;

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

/// Thin wrapper around `nokhwa::Camera` so the main loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    index: u32,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open camera `index` and start streaming, aiming for the requested
    /// resolution. The stream may settle on a close-but-different mode; the
    /// actual resolution is what `resolution()` reports afterwards.
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, Error> {
        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,
        );
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(CameraIndex::Index(index), req).map_err(|e| Error::CameraOpen {
            index,
            reason: e.to_string(),
        })?;

        cam.open_stream().map_err(|e| Error::CameraOpen {
            index,
            reason: format!("open stream: {e}"),
        })?;

        let actual = cam.resolution();
        Ok(Self {
            cam,
            index,
            width: actual.width(),
            height: actual.height(),
        })
    }

    /// Block for the next frame and convert it to 0x00RRGGBB pixels.
    /// A failed read is fatal to the run; no retry is attempted.
    pub fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraRead(format!("fetch (camera {}): {e}", self.index)))?;

        let rgb = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraRead(format!("decode: {e}")))?;

        let (w, h) = rgb.dimensions();
        let mut pixels = Vec::with_capacity((w as usize) * (h as usize));
        for px in rgb.pixels() {
            let r = px[0] as u32;
            let g = px[1] as u32;
            let b = px[2] as u32;
            pixels.push((r << 16) | (g << 8) | b);
        }

        Ok(FrameBuffer {
            width: w as usize,
            height: h as usize,
            pixels,
        })
    }

    /// Actual resolution the stream is delivering.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Release the stream. Called on every exit path; errors on teardown are
    /// not worth surfacing.
    pub fn stop(&mut self) {
        let _ = self.cam.stop_stream();
    }
}
