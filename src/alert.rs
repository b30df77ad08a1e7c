// Alert evaluation and recording throttle.
//
// Two separate outputs per frame: `alerting` drives the overlay every
// qualifying frame, `should_record` gates the side effects (log line +
// snapshot) to at most one per cooldown window. The cooldown clock lives for
// the whole process and is never reset by reselection.

use std::time::{Duration, Instant};

use crate::types::{BBox, Point};

/// What the evaluator decided for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// The current frame qualifies as an alert (render the overlay).
    pub alerting: bool,
    /// This alert should also be logged and snapshotted (throttled).
    pub should_record: bool,
    /// Human-readable reason, present whenever `alerting` is true.
    pub reason: Option<String>,
    /// Drift in pixels from the original center, when tracking succeeded.
    pub drift_px: Option<f64>,
}

impl Verdict {
    fn calm(drift_px: Option<f64>) -> Self {
        Self {
            alerting: false,
            should_record: false,
            reason: None,
            drift_px,
        }
    }
}

pub struct AlertEvaluator {
    move_threshold_px: f64,
    cooldown: Duration,
    last_recorded: Option<Instant>,
}

impl AlertEvaluator {
    pub fn new(move_threshold_px: f64, cooldown: Duration) -> Self {
        Self {
            move_threshold_px,
            cooldown,
            last_recorded: None,
        }
    }

    /// Judge one frame. `result` is the tracker's output, `origin` the center
    /// fixed at the last successful init. Drift is measured against that
    /// origin for the life of the session, so slow creep past the threshold
    /// still triggers even when each frame-to-frame delta is tiny.
    pub fn evaluate(&mut self, result: Option<BBox>, origin: Point, now: Instant) -> Verdict {
        let (reason, drift_px) = match result {
            None => ("object not detected".to_string(), None),
            Some(bbox) => {
                let drift = origin.distance(bbox.center());
                // Strictly greater: drift exactly at the threshold is calm.
                if drift > self.move_threshold_px {
                    (
                        format!("object moved! ({}px drift)", drift as i64),
                        Some(drift),
                    )
                } else {
                    return Verdict::calm(Some(drift));
                }
            }
        };

        let should_record = match self.last_recorded {
            None => true,
            Some(last) => now.duration_since(last) >= self.cooldown,
        };
        if should_record {
            self.last_recorded = Some(now);
        }

        Verdict {
            alerting: true,
            should_record,
            reason: Some(reason),
            drift_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> AlertEvaluator {
        AlertEvaluator::new(40.0, Duration::from_secs(5))
    }

    #[test]
    fn lost_tracking_alerts_immediately() {
        let mut ev = evaluator();
        let v = ev.evaluate(None, Point::new(100, 100), Instant::now());
        assert!(v.alerting);
        assert!(v.should_record);
        assert_eq!(v.reason.as_deref(), Some("object not detected"));
        assert_eq!(v.drift_px, None);
    }

    #[test]
    fn drift_at_the_threshold_is_calm() {
        let mut ev = evaluator();
        let origin = Point::new(100, 100);
        // Exactly 40 px along one axis.
        let v = ev.evaluate(Some(BBox::new(130, 90, 20, 20)), origin, Instant::now());
        assert_eq!(v.drift_px, Some(40.0));
        assert!(!v.alerting);
        assert!(!v.should_record);
    }

    #[test]
    fn drift_one_past_the_threshold_alerts() {
        let mut ev = evaluator();
        let origin = Point::new(100, 100);
        let v = ev.evaluate(Some(BBox::new(131, 90, 20, 20)), origin, Instant::now());
        assert_eq!(v.drift_px, Some(41.0));
        assert!(v.alerting);
        assert!(v.should_record);
        assert_eq!(v.reason.as_deref(), Some("object moved! (41px drift)"));
    }

    #[test]
    fn recording_is_throttled_by_the_cooldown() {
        let mut ev = evaluator();
        let origin = Point::new(0, 0);
        let far = Some(BBox::new(200, 200, 10, 10));
        let t0 = Instant::now();

        let first = ev.evaluate(far, origin, t0);
        assert!(first.alerting && first.should_record);

        // Qualifying frame inside the window: overlay yes, record no.
        let second = ev.evaluate(far, origin, t0 + Duration::from_secs(2));
        assert!(second.alerting);
        assert!(!second.should_record);

        // After the cooldown elapses a second record goes out.
        let third = ev.evaluate(far, origin, t0 + Duration::from_secs(5));
        assert!(third.alerting && third.should_record);
    }

    #[test]
    fn calm_frames_do_not_consume_the_cooldown() {
        let mut ev = evaluator();
        let origin = Point::new(100, 100);
        let t0 = Instant::now();

        ev.evaluate(None, origin, t0);
        // Tracking recovers in place; no alert, no record.
        let calm = ev.evaluate(Some(BBox::new(90, 90, 20, 20)), origin, t0 + Duration::from_secs(1));
        assert!(!calm.alerting);

        // The next loss inside the window is still throttled.
        let again = ev.evaluate(None, origin, t0 + Duration::from_secs(2));
        assert!(again.alerting);
        assert!(!again.should_record);
    }

    #[test]
    fn cooldown_survives_a_change_of_origin() {
        // Reselection swaps the origin but never resets the throttle.
        let mut ev = evaluator();
        let t0 = Instant::now();
        ev.evaluate(None, Point::new(0, 0), t0);

        let v = ev.evaluate(None, Point::new(300, 300), t0 + Duration::from_secs(1));
        assert!(v.alerting);
        assert!(!v.should_record);
    }
}
