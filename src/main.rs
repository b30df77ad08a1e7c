// Supervisory loop: capture -> track -> evaluate -> render -> input.
// Single-threaded and synchronous; the window's rate limiter paces the loop.

use std::time::Instant;

use clap::Parser;
use log::{error, info, warn};

use watchpost::alert::AlertEvaluator;
use watchpost::camera::CameraCapture;
use watchpost::config::{CAPTURE_HEIGHT, CAPTURE_WIDTH, Config};
use watchpost::draw::Drawer;
use watchpost::error::Error;
use watchpost::roi::select_region;
use watchpost::snapshot::save_snapshot;
use watchpost::tracker::{TrackState, Tracker};
use watchpost::ui::{self, ButtonAction, Pointer};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    if let Err(e) = run(&config) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Error> {
    info!(
        "snapshots will be saved to {}",
        config.snapshot_dir.display()
    );
    info!("press R / click Reselect to pick a new region, Q / click Quit to quit");

    // Open the device before any window appears: an unusable camera index is
    // reported on the console and that's the whole run.
    let mut cam = CameraCapture::new(config.camera_index, CAPTURE_WIDTH, CAPTURE_HEIGHT)?;

    let result = watch(&mut cam, config);
    cam.stop();
    result
}

fn watch(cam: &mut CameraCapture, config: &Config) -> Result<(), Error> {
    // Initial selection. Cancelling here means there is nothing to watch.
    let frame = cam.next_frame()?;
    let Some(bbox) = select_region(&frame)? else {
        info!("no region selected; exiting");
        return Ok(());
    };

    let mut tracker = Tracker::create();
    let init_frame = cam.next_frame()?;
    tracker.init(&init_frame, bbox);
    // Uninitialized until the first update lands on Tracking or Lost.
    let mut state = TrackState::Uninitialized;

    let mut origin = bbox.center();
    info!("tracking started, original center ({}, {})", origin.x, origin.y);

    let (w, h) = cam.resolution();
    let mut drawer = Drawer::new("Watchpost", w as usize, h as usize)?;
    let mut pointer = Pointer::new();
    let mut evaluator = AlertEvaluator::new(config.move_threshold, config.cooldown());

    while drawer.is_open() {
        let mut frame = cam.next_frame()?;

        let result = tracker.update(&frame);
        let now_state = if result.is_some() {
            TrackState::Tracking
        } else {
            TrackState::Lost
        };
        match (state, now_state) {
            (TrackState::Lost, TrackState::Tracking) => info!("tracking recovered"),
            (s, TrackState::Lost) if s != TrackState::Lost => info!("tracking lost"),
            _ => {}
        }
        state = now_state;

        let verdict = evaluator.evaluate(result, origin, Instant::now());
        if verdict.alerting {
            let reason = verdict.reason.as_deref().unwrap_or("alert");
            ui::draw_alert(&mut frame, reason);
            if verdict.should_record {
                warn!("*** ALERT *** {reason}");
                // A failed snapshot is worth a complaint, not a crash.
                match save_snapshot(&frame, &config.snapshot_dir) {
                    Ok(path) => info!("snapshot saved: {}", path.display()),
                    Err(e) => warn!("could not save snapshot: {e}"),
                }
            }
        } else if let Some(found) = result {
            ui::draw_watching(&mut frame, found);
        }

        // Buttons are recomputed from this frame's dimensions; clicks below
        // are tested against these same rectangles.
        let buttons = ui::layout_buttons(frame.width, frame.height);
        ui::draw_buttons(&mut frame, &buttons, &pointer);
        drawer.present(&frame)?;

        pointer.sample(&drawer);
        let clicked = if pointer.take_click() {
            ui::hit_test(&buttons, pointer.x, pointer.y)
        } else {
            None
        };

        if drawer.quit_pressed() || clicked == Some(ButtonAction::Quit) {
            info!("quitting");
            break;
        }
        if drawer.reselect_pressed() || clicked == Some(ButtonAction::Reselect) {
            let frame = cam.next_frame()?;
            if let Some(new_bbox) = select_region(&frame)? {
                // Fresh session: new tracker, new origin. The alert cooldown
                // carries over.
                tracker = Tracker::create();
                let init_frame = cam.next_frame()?;
                tracker.init(&init_frame, new_bbox);
                state = TrackState::Uninitialized;
                origin = new_bbox.center();
                info!("re-tracking from new position ({}, {})", origin.x, origin.y);
            }
            // Cancelled reselect keeps the previous tracker and origin.
        }
    }

    Ok(())
}
