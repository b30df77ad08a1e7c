// End-to-end pipeline on synthetic frames: selection bookkeeping, template
// tracking, alert evaluation and snapshot recording, no camera or window.

use std::time::{Duration, Instant};

use watchpost::alert::AlertEvaluator;
use watchpost::error::Error;
use watchpost::roi::DragRect;
use watchpost::snapshot::save_snapshot;
use watchpost::tracker::TemplateTracker;
use watchpost::types::{BBox, FrameBuffer};

const FRAME_W: usize = 120;
const FRAME_H: usize = 60;

/// A frame with a textured rectangle at (x0, y0); everything else black.
fn frame_with_object(x0: usize, y0: usize, w: usize, h: usize) -> FrameBuffer {
    let mut fb = FrameBuffer::new(FRAME_W, FRAME_H);
    for dy in 0..h {
        for dx in 0..w {
            let v = ((dx * 31 + dy * 57) % 200 + 30) as u32;
            fb.pixels[(y0 + dy) * FRAME_W + (x0 + dx)] = (v << 16) | (v << 8) | v;
        }
    }
    fb
}

#[test]
fn watch_moved_object_records_once_per_cooldown() {
    // Operator drags a box around the object.
    let mut drag = DragRect::new();
    drag.update(12, 10, true);
    drag.update(42, 34, true);
    drag.update(42, 34, false);
    let bbox = drag.selection().expect("a real drag yields a selection");
    assert_eq!(bbox, BBox::new(12, 10, 30, 24));

    let scene = frame_with_object(12, 10, 30, 24);
    let mut tracker = TemplateTracker::new();
    tracker.init(&scene, bbox);
    let origin = bbox.center();

    let mut evaluator = AlertEvaluator::new(40.0, Duration::from_secs(5));
    let t0 = Instant::now();

    // Five still frames: tracked in place, zero drift, no alerts.
    for i in 0..5 {
        let found = tracker.update(&scene).expect("still object stays tracked");
        let v = evaluator.evaluate(Some(found), origin, t0 + Duration::from_millis(33 * i));
        assert_eq!(v.drift_px, Some(0.0));
        assert!(!v.alerting);
        assert!(!v.should_record);
    }

    // The object jumps 45 px right: past the 40 px threshold.
    let moved = frame_with_object(57, 10, 30, 24);
    let found = tracker.update(&moved).expect("moved object is still visible");
    assert_eq!(found, BBox::new(57, 10, 30, 24));

    let dir = std::env::temp_dir().join(format!("watchpost-e2e-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let v = evaluator.evaluate(Some(found), origin, t0 + Duration::from_millis(200));
    assert!(v.alerting);
    assert!(v.should_record);
    assert_eq!(v.reason.as_deref(), Some("object moved! (45px drift)"));
    save_snapshot(&moved, &dir).expect("snapshot written on record");

    // Next qualifying frame is inside the cooldown: overlay only.
    let found = tracker.update(&moved).unwrap();
    let v = evaluator.evaluate(Some(found), origin, t0 + Duration::from_millis(400));
    assert!(v.alerting);
    assert!(!v.should_record);

    let files = std::fs::read_dir(&dir).unwrap().count();
    assert_eq!(files, 1, "exactly one snapshot inside the cooldown window");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn losing_the_object_alerts_until_reselect() {
    let scene = frame_with_object(20, 12, 24, 20);
    let bbox = BBox::new(20, 12, 24, 20);
    let mut tracker = TemplateTracker::new();
    tracker.init(&scene, bbox);

    let mut evaluator = AlertEvaluator::new(40.0, Duration::from_secs(5));
    let t0 = Instant::now();

    // Object gone: every frame alerts, only the first records.
    let empty = FrameBuffer::new(FRAME_W, FRAME_H);
    assert_eq!(tracker.update(&empty), None);
    let v = evaluator.evaluate(None, bbox.center(), t0);
    assert!(v.alerting && v.should_record);
    assert_eq!(v.reason.as_deref(), Some("object not detected"));
    let v = evaluator.evaluate(None, bbox.center(), t0 + Duration::from_millis(100));
    assert!(v.alerting && !v.should_record);

    // Reselect: a fresh tracker and origin replace the old ones outright.
    let elsewhere = frame_with_object(70, 30, 24, 20);
    let new_bbox = BBox::new(70, 30, 24, 20);
    let mut tracker = TemplateTracker::new();
    tracker.init(&elsewhere, new_bbox);
    let origin = new_bbox.center();

    let found = tracker.update(&elsewhere).expect("fresh selection tracks");
    let v = evaluator.evaluate(Some(found), origin, t0 + Duration::from_millis(200));
    assert!(!v.alerting, "drift restarts from the new origin");

    // The cooldown carried over: an immediate loss renders but won't record.
    let v = evaluator.evaluate(None, origin, t0 + Duration::from_millis(300));
    assert!(v.alerting && !v.should_record);
}

#[test]
fn cancelled_reselect_keeps_the_old_session() {
    let scene = frame_with_object(12, 10, 30, 24);
    let bbox = BBox::new(12, 10, 30, 24);
    let mut tracker = TemplateTracker::new();
    tracker.init(&scene, bbox);

    // A click without a drag is a degenerate selection: no new region.
    let mut drag = DragRect::new();
    drag.update(40, 40, true);
    drag.update(40, 40, false);
    assert_eq!(drag.selection(), None);

    // The untouched tracker still works against its original reference.
    let found = tracker.update(&scene).unwrap();
    assert_eq!(found, bbox);
}

#[test]
fn camera_open_error_names_the_index() {
    let err = Error::CameraOpen {
        index: 3,
        reason: "no such device".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("index 3"), "got: {msg}");
}
