mod acquire;
mod synthetic;

pub use acquire::{acquire_with_retry, RetryPolicy};
pub use synthetic::SyntheticCamera;

use image::RgbImage;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera access denied")]
    Denied,
    #[error("no capture device available: {0}")]
    Unavailable(String),
}

/// Source of raster frames behind an open capture stream.
pub trait FrameGrabber: Send + Sync {
    /// Current frame, or `None` when the device has nothing to show yet.
    fn grab(&self) -> Option<RgbImage>;
}

/// A capture backend the acquisition manager can open. The built-in
/// [`SyntheticCamera`] and any platform webcam backend both implement this.
pub trait CaptureDevice: Send + Sync {
    fn open(&self) -> Result<CaptureStream, CameraError>;
}

/// Live video stream owned by the portal for the lifetime of the view.
///
/// The sampler reads frames through a shared reference; only the owner
/// releases the stream. Dropping the stream releases the device handle on
/// every exit path.
pub struct CaptureStream {
    live: AtomicBool,
    grabber: Box<dyn FrameGrabber>,
}

impl CaptureStream {
    pub fn new(grabber: Box<dyn FrameGrabber>) -> Self {
        Self {
            live: AtomicBool::new(true),
            grabber,
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Latest frame from the device; `None` once released or when the
    /// device has no frame available.
    pub fn latest_frame(&self) -> Option<RgbImage> {
        if !self.is_live() {
            return None;
        }
        self.grabber.grab()
    }

    /// Return the device handle. Idempotent.
    pub fn release(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            debug!("capture stream released");
        }
    }
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        self.release();
    }
}
