use log::{info, warn};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{CameraError, CaptureDevice, CaptureStream};

/// Retry schedule for camera acquisition.
///
/// The portal runs unbounded (kiosk-style, one attempt per second until the
/// view unmounts); bounded policies exist for callers that prefer to give
/// up.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    pub fn capped(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts),
        }
    }
}

/// Acquire a capture stream, retrying per `policy` on denial or failure.
///
/// `notify_denied` runs once per failed attempt (the user-facing camera
/// permission notice). Cancellation aborts the wait between attempts and
/// guarantees no further attempts afterwards. Returns `None` when cancelled
/// or when a bounded policy runs out of attempts.
pub async fn acquire_with_retry<F>(
    device: &dyn CaptureDevice,
    policy: RetryPolicy,
    cancel: &CancellationToken,
    mut notify_denied: F,
) -> Option<CaptureStream>
where
    F: FnMut(&CameraError),
{
    let mut attempts: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            return None;
        }

        match device.open() {
            Ok(stream) => {
                info!("camera acquired after {} failed attempt(s)", attempts);
                return Some(stream);
            }
            Err(err) => {
                attempts += 1;
                warn!("camera acquisition attempt {attempts} failed: {err}");
                notify_denied(&err);

                if let Some(max) = policy.max_attempts {
                    if attempts >= max {
                        warn!("camera acquisition giving up after {attempts} attempts");
                        return None;
                    }
                }

                tokio::select! {
                    _ = cancel.cancelled() => return None,
                    _ = tokio::time::sleep(policy.delay) => {}
                }
            }
        }
    }
}
