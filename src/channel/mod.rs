mod state;
mod worker;

pub use state::ChannelState;

use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::telemetry::TelemetrySnapshot;

/// Outbound frames queued but not yet written to the socket. Frames are
/// perishable, so the queue is shallow; overflow drops the frame.
const OUTBOUND_QUEUE_DEPTH: usize = 8;

/// Drop counters surfaced by the channel. Both paths are lossy by design
/// (frames are perishable, the backend is co-developed), but the drops are
/// counted rather than invisible.
#[derive(Debug, Default)]
pub struct ChannelCounters {
    /// Inbound messages that failed to parse as telemetry.
    pub malformed_drops: AtomicU64,
    /// Outbound frames dropped because the channel was not ready.
    pub skipped_frames: AtomicU64,
}

/// Handle to the persistent backend connection for one student identity.
///
/// Opening spawns a worker task owning the socket; the handle exposes the
/// lifecycle state and the latest telemetry snapshot as watch channels,
/// single-writer (the worker), multi-reader (the views).
pub struct TelemetryChannel {
    state_rx: watch::Receiver<ChannelState>,
    snapshot_rx: watch::Receiver<Option<TelemetrySnapshot>>,
    outbound_tx: mpsc::Sender<String>,
    counters: Arc<ChannelCounters>,
    cancel: CancellationToken,
    worker: JoinHandle<()>,
}

impl TelemetryChannel {
    /// Open a connection to `endpoint` (`ws://<host>:<port>/ws/<student_id>`).
    pub fn open(endpoint: String) -> Self {
        let (state_tx, state_rx) = watch::channel(ChannelState::Disconnected);
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_DEPTH);
        let counters = Arc::new(ChannelCounters::default());
        let cancel = CancellationToken::new();

        let worker = tokio::spawn(worker::channel_worker(
            endpoint,
            state_tx,
            snapshot_tx,
            outbound_rx,
            Arc::clone(&counters),
            cancel.clone(),
        ));

        Self {
            state_rx,
            snapshot_rx,
            outbound_tx,
            counters,
            cancel,
            worker,
        }
    }

    pub fn state(&self) -> ChannelState {
        *self.state_rx.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    pub fn snapshot(&self) -> Option<TelemetrySnapshot> {
        self.snapshot_rx.borrow().clone()
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<Option<TelemetrySnapshot>> {
        self.snapshot_rx.clone()
    }

    /// Cloneable outbound half for the frame sampler.
    pub fn frame_sender(&self) -> FrameSender {
        FrameSender {
            state_rx: self.state_rx.clone(),
            outbound_tx: self.outbound_tx.clone(),
            counters: Arc::clone(&self.counters),
        }
    }

    pub fn malformed_drops(&self) -> u64 {
        self.counters.malformed_drops.load(Ordering::Relaxed)
    }

    pub fn skipped_frames(&self) -> u64 {
        self.counters.skipped_frames.load(Ordering::Relaxed)
    }

    /// Tear the connection down and wait for the worker to finish. Safe on
    /// every exit path; sends a close frame when the socket is still open.
    pub async fn close(self) {
        self.cancel.cancel();
        if let Err(err) = self.worker.await {
            warn!("channel worker join failed: {err}");
        }
    }
}

/// Guarded outbound half of the channel.
#[derive(Clone)]
pub struct FrameSender {
    state_rx: watch::Receiver<ChannelState>,
    outbound_tx: mpsc::Sender<String>,
    counters: Arc<ChannelCounters>,
}

impl FrameSender {
    /// Queue one encoded frame for transmission.
    ///
    /// Frames are only accepted while the channel is connected and the
    /// queue has room; anything else drops the frame (counted). No
    /// backpressure: the sampler stays open-loop.
    pub fn send(&self, payload: String) {
        if !self.state_rx.borrow().is_connected() {
            self.counters.skipped_frames.fetch_add(1, Ordering::Relaxed);
            debug!("channel not connected; frame skipped");
            return;
        }

        if self.outbound_tx.try_send(payload).is_err() {
            self.counters.skipped_frames.fetch_add(1, Ordering::Relaxed);
            debug!("outbound queue full or closed; frame skipped");
        }
    }
}
