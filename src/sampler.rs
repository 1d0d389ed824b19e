use anyhow::{Context, Result};
use base64::Engine;
use image::{codecs::jpeg::JpegEncoder, imageops, ExtendedColorType, RgbImage};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::camera::CaptureStream;
use crate::channel::FrameSender;
use crate::settings::ClientSettings;

/// Fixed-rate sampling parameters (5 Hz, 320x240, JPEG quality 50 by
/// default; see [`ClientSettings`]).
#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    pub period: Duration,
    pub width: u32,
    pub height: u32,
    pub jpeg_quality: u8,
}

impl From<&ClientSettings> for SamplerConfig {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            period: Duration::from_millis(settings.sample_interval_ms),
            width: settings.frame_width,
            height: settings.frame_height,
            jpeg_quality: settings.jpeg_quality,
        }
    }
}

/// Rasterize one frame into the outbound payload: downscale, JPEG-encode,
/// base64, and wrap as the data-URL string the backend strips.
pub fn encode_frame(frame: &RgbImage, config: &SamplerConfig) -> Result<String> {
    let scaled = imageops::resize(
        frame,
        config.width,
        config.height,
        imageops::FilterType::Triangle,
    );

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, config.jpeg_quality)
        .encode(
            scaled.as_raw(),
            config.width,
            config.height,
            ExtendedColorType::Rgb8,
        )
        .context("jpeg encode failed")?;

    Ok(format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&jpeg)
    ))
}

/// Fixed-rate frame capture loop.
///
/// Open-loop: one frame per tick regardless of how fast the backend
/// answers. A tick with no live frame is a no-op; transmission itself is
/// guarded by the channel, so nothing goes out while not connected. Runs
/// until cancelled (the channel leaving Connected, or portal teardown).
pub async fn sampler_loop(
    stream: Arc<CaptureStream>,
    frames: FrameSender,
    config: SamplerConfig,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("frame sampler stopped");
                break;
            }
            _ = ticker.tick() => {
                let Some(frame) = stream.latest_frame() else {
                    continue;
                };
                match encode_frame(&frame, &config) {
                    Ok(payload) => frames.send(payload),
                    Err(err) => warn!("frame encode failed: {err}"),
                }
            }
        }
    }
}
