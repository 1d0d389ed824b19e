use image::{Rgb, RgbImage};
use std::time::Instant;

use super::{CameraError, CaptureDevice, CaptureStream, FrameGrabber};

/// Built-in capture backend rendering a moving test pattern.
///
/// Stands in for a platform webcam so the whole pipeline runs without
/// hardware (the demo-mode behaviour of the original portal). Successive
/// frames differ, which keeps the outbound payloads realistic.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticCamera {
    pub width: u32,
    pub height: u32,
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl CaptureDevice for SyntheticCamera {
    fn open(&self) -> Result<CaptureStream, CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::Unavailable(
                "synthetic camera needs a non-zero resolution".into(),
            ));
        }

        Ok(CaptureStream::new(Box::new(PatternGrabber {
            width: self.width,
            height: self.height,
            opened: Instant::now(),
        })))
    }
}

struct PatternGrabber {
    width: u32,
    height: u32,
    opened: Instant,
}

impl FrameGrabber for PatternGrabber {
    fn grab(&self) -> Option<RgbImage> {
        let t = self.opened.elapsed().as_secs_f32();
        Some(RgbImage::from_fn(self.width, self.height, |x, y| {
            let phase = ((x + y) as f32 / 24.0 + t * 2.0).sin();
            let lum = ((phase * 0.5 + 0.5) * 255.0) as u8;
            Rgb([lum, lum / 2 + 64, 255 - lum])
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_yields_frames_at_device_resolution() {
        let stream = SyntheticCamera {
            width: 64,
            height: 48,
        }
        .open()
        .unwrap();

        let frame = stream.latest_frame().expect("synthetic frame");
        assert_eq!(frame.dimensions(), (64, 48));
    }

    #[test]
    fn zero_resolution_is_unavailable() {
        let device = SyntheticCamera {
            width: 0,
            height: 480,
        };
        assert!(matches!(device.open(), Err(CameraError::Unavailable(_))));
    }
}
