mod render;

pub use render::PortalRender;

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::camera::{acquire_with_retry, CaptureDevice, RetryPolicy};
use crate::channel::{ChannelState, TelemetryChannel};
use crate::sampler::{sampler_loop, SamplerConfig};
use crate::settings::ClientSettings;

/// Drop counters collected over one mount of the portal, reported on
/// unmount. Both paths are lossy by design; a connected, healthy session
/// should see zeroes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortalStats {
    pub malformed_drops: u64,
    pub skipped_frames: u64,
}

/// Running sampler task plus the token that stops it.
struct SamplerTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

async fn stop_sampler(slot: &mut Option<SamplerTask>) {
    if let Some(task) = slot.take() {
        task.cancel.cancel();
        if let Err(err) = task.handle.await {
            warn!("sampler task join failed: {err}");
        }
        info!("frame sampler stopped");
    }
}

/// Student portal view: mount the capture pipeline, stream frames while
/// the channel is connected, and render inbound telemetry until `cancel`
/// fires (the unmount signal).
///
/// Teardown happens on every exit path: sampler cancelled and joined,
/// channel closed, stream released. A dropped connection leaves the portal
/// idle (visible "Connecting..." badge) rather than reconnecting; remount
/// to reconnect. Returns the drop counters accumulated over the mount.
pub async fn run_portal(
    settings: &ClientSettings,
    student_id: &str,
    device: &dyn CaptureDevice,
    cancel: CancellationToken,
) -> Result<PortalStats> {
    let session_id = Uuid::new_v4();
    info!("student portal mounted for {student_id} (session {session_id})");

    let policy = RetryPolicy::unbounded(Duration::from_millis(settings.camera_retry_delay_ms));
    let stream = acquire_with_retry(device, policy, &cancel, |err| {
        // the original UI raises a blocking permission notice here
        eprintln!("Please give camera access ({err})");
    })
    .await;

    let Some(stream) = stream else {
        info!("student portal unmounted before camera acquisition completed");
        return Ok(PortalStats::default());
    };
    let stream = Arc::new(stream);

    let channel = TelemetryChannel::open(settings.endpoint(student_id));
    let mut state_rx = channel.watch_state();
    let mut snapshot_rx = channel.watch_snapshot();
    let sampler_config = SamplerConfig::from(settings);
    let mut sampler: Option<SamplerTask> = None;

    render(channel.state(), channel.snapshot().as_ref());

    // the watch branches disarm once the connection worker is gone; the
    // portal itself stays mounted (idle, Disconnected) until cancelled
    let mut state_alive = true;
    let mut snapshot_alive = true;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = state_rx.changed(), if state_alive => {
                if changed.is_err() {
                    state_alive = false;
                    stop_sampler(&mut sampler).await;
                    continue;
                }
                let state = *state_rx.borrow_and_update();
                match state {
                    ChannelState::Connected => {
                        if sampler.is_none() {
                            let child = cancel.child_token();
                            let handle = tokio::spawn(sampler_loop(
                                Arc::clone(&stream),
                                channel.frame_sender(),
                                sampler_config,
                                child.clone(),
                            ));
                            sampler = Some(SamplerTask { cancel: child, handle });
                            info!(
                                "frame sampler started ({} ms period)",
                                sampler_config.period.as_millis()
                            );
                        }
                    }
                    ChannelState::Disconnected => {
                        stop_sampler(&mut sampler).await;
                        warn!("telemetry channel dropped; portal idle until remount");
                    }
                    ChannelState::Connecting => {}
                }
                render(state, channel.snapshot().as_ref());
            }
            changed = snapshot_rx.changed(), if snapshot_alive => {
                if changed.is_err() {
                    snapshot_alive = false;
                    continue;
                }
                snapshot_rx.borrow_and_update();
                render(channel.state(), channel.snapshot().as_ref());
            }
        }
    }

    stop_sampler(&mut sampler).await;
    let stats = PortalStats {
        malformed_drops: channel.malformed_drops(),
        skipped_frames: channel.skipped_frames(),
    };
    channel.close().await;
    stream.release();
    info!(
        "student portal unmounted (session {session_id}; {} malformed drops, {} frames skipped)",
        stats.malformed_drops, stats.skipped_frames
    );
    Ok(stats)
}

fn render(state: ChannelState, snapshot: Option<&crate::telemetry::TelemetrySnapshot>) {
    let view = PortalRender::compose(state, snapshot, Utc::now());

    println!(
        "[{}] {} | emotion: {} | integrity: {}",
        state, view.status_text, view.emotion_text, view.integrity_text
    );
    if view.alert_overlay {
        println!("  !! Please look at the screen !!");
    }
    if let Some(line) = view.console.last() {
        println!("  {line}");
    }
}
