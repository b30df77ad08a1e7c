// Tracking engine adapter.
//
// Two engines behind one contract: `init(frame, bbox)` then
// `update(frame) -> Option<BBox>` (None = lost). Which engine runs is decided
// once, at construction, not re-probed per frame:
//   - `Csrt` (feature `csrt`): OpenCV's CSRT correlation-filter tracker.
//   - `Template`: built-in grayscale template matching, always available.

use image::GrayImage;
use log::info;

use crate::types::{BBox, FrameBuffer};

/// Minimum zero-mean normalized cross-correlation score the template engine
/// accepts as a match.
pub const CONFIDENCE_THRESHOLD: f32 = 0.45;

/// Tracking lifecycle as the main loop sees it. Owned by the loop; `init`
/// moves to Tracking, each `update` lands on Tracking or Lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Uninitialized,
    Tracking,
    Lost,
}

pub enum Tracker {
    #[cfg(feature = "csrt")]
    Csrt(csrt::CsrtTracker),
    Template(TemplateTracker),
}

impl Tracker {
    /// Capability detection, performed once per tracking session: try the
    /// preferred engine, fall back to template matching. The choice is fixed
    /// for the lifetime of this value.
    pub fn create() -> Self {
        #[cfg(feature = "csrt")]
        match csrt::CsrtTracker::new() {
            Ok(t) => {
                info!("using CSRT tracker");
                return Tracker::Csrt(t);
            }
            Err(e) => log::warn!("CSRT tracker unavailable ({e}); using template matching"),
        }
        #[cfg(not(feature = "csrt"))]
        info!("built without CSRT support; using template matching (rebuild with --features csrt for better tracking)");
        Tracker::Template(TemplateTracker::new())
    }

    /// Lock onto the region at `bbox`. Must run before the first `update`,
    /// and again after any reselect (in practice the loop replaces the whole
    /// tracker on reselect).
    pub fn init(&mut self, frame: &FrameBuffer, bbox: BBox) {
        match self {
            #[cfg(feature = "csrt")]
            Tracker::Csrt(t) => {
                if let Err(e) = t.init(frame, bbox) {
                    log::warn!("CSRT init failed: {e}");
                }
            }
            Tracker::Template(t) => t.init(frame, bbox),
        }
    }

    /// One tracking step. `None` means the object was not found this frame
    /// (engine failure and a low-confidence match are indistinguishable).
    pub fn update(&mut self, frame: &FrameBuffer) -> Option<BBox> {
        match self {
            #[cfg(feature = "csrt")]
            Tracker::Csrt(t) => t.update(frame),
            Tracker::Template(t) => t.update(frame),
        }
    }
}

/// Grayscale patch stored zero-mean, with its norm precomputed so a match
/// score needs only one pass over each candidate window.
struct Patch {
    width: u32,
    height: u32,
    centered: Vec<f32>,
    norm: f32,
}

/// Fallback engine: normalized cross-correlation of a fixed reference patch
/// against the grayscale frame.
///
/// The patch is captured once at `init` and never adapted, so gradual
/// appearance change (lighting, rotation) degrades the score over time and
/// eventually reads as "lost" even for a stationary object. Known
/// limitation, kept as-is.
#[derive(Default)]
pub struct TemplateTracker {
    patch: Option<Patch>,
}

impl TemplateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the grayscale patch under `bbox`, clamped to frame bounds.
    pub fn init(&mut self, frame: &FrameBuffer, bbox: BBox) {
        let gray = frame.to_gray();
        let (fw, fh) = gray.dimensions();

        let x0 = bbox.x.clamp(0, fw as i32) as u32;
        let y0 = bbox.y.clamp(0, fh as i32) as u32;
        let x1 = (bbox.x + bbox.width).clamp(0, fw as i32) as u32;
        let y1 = (bbox.y + bbox.height).clamp(0, fh as i32) as u32;
        if x1 <= x0 || y1 <= y0 {
            self.patch = None;
            return;
        }

        let (pw, ph) = (x1 - x0, y1 - y0);
        let n = (pw * ph) as usize;
        let mut values = Vec::with_capacity(n);
        for y in y0..y1 {
            for x in x0..x1 {
                values.push(gray.get_pixel(x, y).0[0] as f32);
            }
        }
        let mean = values.iter().sum::<f32>() / n as f32;
        let centered: Vec<f32> = values.iter().map(|v| v - mean).collect();
        let norm = centered.iter().map(|v| v * v).sum::<f32>().sqrt();

        self.patch = Some(Patch {
            width: pw,
            height: ph,
            centered,
            norm,
        });
    }

    /// Scan the whole frame for the stored patch. Reports the best-scoring
    /// location only if its score meets the confidence threshold.
    pub fn update(&mut self, frame: &FrameBuffer) -> Option<BBox> {
        let patch = self.patch.as_ref()?;
        if patch.norm <= f32::EPSILON {
            // A flat reference patch matches everything and nothing.
            return None;
        }

        let gray = frame.to_gray();
        let (fw, fh) = gray.dimensions();
        if patch.width > fw || patch.height > fh {
            return None;
        }

        let (loc, score) = best_match(&gray, patch)?;
        if score < CONFIDENCE_THRESHOLD {
            return None;
        }
        Some(BBox::new(
            loc.0 as i32,
            loc.1 as i32,
            patch.width as i32,
            patch.height as i32,
        ))
    }
}

/// Zero-mean NCC over every window position. For a window f and the centered
/// patch t', the numerator reduces to dot(f, t') because sum(t') = 0, and the
/// window variance comes from its running sums, so one pass per offset does.
fn best_match(gray: &GrayImage, patch: &Patch) -> Option<((u32, u32), f32)> {
    let (fw, fh) = gray.dimensions();
    let (pw, ph) = (patch.width, patch.height);
    let n = (pw * ph) as f32;
    let frame = gray.as_raw();

    let mut best: Option<((u32, u32), f32)> = None;
    for oy in 0..=(fh - ph) {
        for ox in 0..=(fw - pw) {
            let mut sum = 0.0f32;
            let mut sum_sq = 0.0f32;
            let mut dot = 0.0f32;
            for py in 0..ph {
                let row = ((oy + py) * fw + ox) as usize;
                let trow = (py * pw) as usize;
                for px in 0..pw {
                    let f = frame[row + px as usize] as f32;
                    sum += f;
                    sum_sq += f * f;
                    dot += f * patch.centered[trow + px as usize];
                }
            }
            let var = sum_sq - sum * sum / n;
            if var <= 0.0 {
                continue; // flat window, no correlation to speak of
            }
            let score = dot / (var.sqrt() * patch.norm);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some(((ox, oy), score));
            }
        }
    }
    best
}

#[cfg(feature = "csrt")]
mod csrt {
    //! Preferred engine: OpenCV's CSRT correlation-filter tracker. The
    //! binding exposes a single CSRT namespace, so capability detection is
    //! one runtime construction attempt.

    use opencv::core::{Mat, Ptr, Rect};
    use opencv::prelude::*;
    use opencv::tracking::{TrackerCSRT, TrackerCSRT_Params};

    use crate::types::{BBox, FrameBuffer};

    pub struct CsrtTracker {
        inner: Ptr<TrackerCSRT>,
    }

    impl CsrtTracker {
        pub fn new() -> opencv::Result<Self> {
            let params = TrackerCSRT_Params::default()?;
            Ok(Self {
                inner: TrackerCSRT::create(&params)?,
            })
        }

        pub fn init(&mut self, frame: &FrameBuffer, bbox: BBox) -> opencv::Result<()> {
            let mat = to_bgr_mat(frame)?;
            self.inner
                .init(&mat, Rect::new(bbox.x, bbox.y, bbox.width, bbox.height))
        }

        pub fn update(&mut self, frame: &FrameBuffer) -> Option<BBox> {
            let mat = to_bgr_mat(frame).ok()?;
            let mut rect = Rect::default();
            match self.inner.update(&mat, &mut rect) {
                Ok(true) => Some(BBox::new(rect.x, rect.y, rect.width, rect.height)),
                _ => None,
            }
        }
    }

    /// Pack the 0x00RRGGBB buffer into a CV_8UC3 BGR Mat.
    fn to_bgr_mat(frame: &FrameBuffer) -> opencv::Result<Mat> {
        let mut data = Vec::with_capacity(frame.pixels.len() * 3);
        for px in &frame.pixels {
            data.push((px & 0xFF) as u8);
            data.push(((px >> 8) & 0xFF) as u8);
            data.push(((px >> 16) & 0xFF) as u8);
        }
        let flat = Mat::from_slice(&data)?;
        let shaped = flat.reshape(3, frame.height as i32)?;
        shaped.try_clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paint a deterministic textured rectangle; r = g = b so the gray value
    /// equals the painted value exactly.
    fn paint_pattern(fb: &mut FrameBuffer, x0: usize, y0: usize, w: usize, h: usize) {
        for dy in 0..h {
            for dx in 0..w {
                let v = ((dx * 31 + dy * 57) % 200 + 30) as u32;
                fb.pixels[(y0 + dy) * fb.width + (x0 + dx)] = (v << 16) | (v << 8) | v;
            }
        }
    }

    #[test]
    fn finds_an_exact_copy_at_a_new_offset() {
        let mut first = FrameBuffer::new(64, 48);
        paint_pattern(&mut first, 20, 12, 12, 10);

        let mut tracker = TemplateTracker::new();
        tracker.init(&first, BBox::new(20, 12, 12, 10));

        // Same patch content, different place, over a faint checker floor.
        let mut next = FrameBuffer::new(64, 48);
        for (i, px) in next.pixels.iter_mut().enumerate() {
            let (x, y) = (i % 64, i / 64);
            let v = (((x + y) % 2) * 12) as u32;
            *px = (v << 16) | (v << 8) | v;
        }
        paint_pattern(&mut next, 5, 6, 12, 10);

        let found = tracker.update(&next).expect("patch should be found");
        assert_eq!(found, BBox::new(5, 6, 12, 10));
    }

    #[test]
    fn reports_lost_when_nothing_matches() {
        let mut first = FrameBuffer::new(64, 48);
        paint_pattern(&mut first, 10, 10, 12, 10);

        let mut tracker = TemplateTracker::new();
        tracker.init(&first, BBox::new(10, 10, 12, 10));

        // A uniform frame has zero variance everywhere: no window correlates.
        let flat = FrameBuffer::new(64, 48);
        assert_eq!(tracker.update(&flat), None);
    }

    #[test]
    fn uninitialized_update_is_lost() {
        let mut tracker = TemplateTracker::new();
        let frame = FrameBuffer::new(32, 32);
        assert_eq!(tracker.update(&frame), None);
    }

    #[test]
    fn patch_larger_than_the_frame_is_lost() {
        let mut big = FrameBuffer::new(64, 48);
        paint_pattern(&mut big, 0, 0, 40, 40);
        let mut tracker = TemplateTracker::new();
        tracker.init(&big, BBox::new(0, 0, 40, 40));

        let small = FrameBuffer::new(20, 20);
        assert_eq!(tracker.update(&small), None);
    }

    #[test]
    fn flat_reference_patch_never_matches() {
        // All-black patch has zero norm; matching it would divide by zero.
        let first = FrameBuffer::new(64, 48);
        let mut tracker = TemplateTracker::new();
        tracker.init(&first, BBox::new(4, 4, 8, 8));
        assert_eq!(tracker.update(&first), None);
    }

    #[test]
    fn init_clamps_the_box_to_frame_bounds() {
        let mut first = FrameBuffer::new(64, 48);
        paint_pattern(&mut first, 56, 40, 8, 8);

        let mut tracker = TemplateTracker::new();
        // Box hangs off the bottom-right corner; only the inside part sticks.
        tracker.init(&first, BBox::new(56, 40, 20, 20));

        let found = tracker.update(&first).expect("clamped patch still matches");
        assert_eq!(found, BBox::new(56, 40, 8, 8));
    }

    #[test]
    fn default_engine_is_the_template_tracker() {
        // Without the csrt feature, capability detection lands on Template.
        #[cfg(not(feature = "csrt"))]
        assert!(matches!(Tracker::create(), Tracker::Template(_)));
    }
}
