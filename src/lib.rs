//! Watchpost: keep an eye on one region of a live webcam feed.
//!
//! The operator draws a box around an object; each frame the tracker reports
//! where it went, the evaluator decides whether that constitutes an alert
//! (lost, or drifted too far from the original center), and recorded alerts
//! are throttled to one log line + JPEG snapshot per cooldown window.
//!
//! Tracking itself is delegated: OpenCV's CSRT tracker when built with the
//! `csrt` feature, a built-in grayscale template matcher otherwise.

pub mod alert;
pub mod camera;
pub mod config;
pub mod draw;
pub mod error;
pub mod roi;
pub mod snapshot;
pub mod tracker;
pub mod types;
pub mod ui;
