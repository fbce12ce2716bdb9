//! doorwatch-hw — Camera capture for the door watcher.
//!
//! Provides V4L2-based colour capture (YUYV or MJPG) and the frame helpers
//! used before faces are encoded.

pub mod camera;
pub mod frame;

pub use camera::{resolve_device_path, Camera, CameraError, CaptureSource, PixelFormat};
pub use frame::Frame;
