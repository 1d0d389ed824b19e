use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

use crate::telemetry::TelemetrySnapshot;

use super::{ChannelCounters, ChannelState};

/// Connection worker: owns the socket for one mount of the channel.
///
/// Runs the handshake, then multiplexes inbound telemetry, outbound frames
/// and cancellation. Exits (leaving the state at `Disconnected`) on close,
/// transport error or teardown; reconnection is a remount concern.
pub(super) async fn channel_worker(
    endpoint: String,
    state_tx: watch::Sender<ChannelState>,
    snapshot_tx: watch::Sender<Option<TelemetrySnapshot>>,
    mut outbound_rx: mpsc::Receiver<String>,
    counters: Arc<ChannelCounters>,
    cancel: CancellationToken,
) {
    transition(&state_tx, ChannelState::Connecting);
    info!("opening telemetry channel to {endpoint}");

    let stream = tokio::select! {
        result = connect_async(endpoint.as_str()) => match result {
            Ok((stream, _response)) => stream,
            Err(err) => {
                warn!("telemetry channel handshake failed: {err}");
                transition(&state_tx, ChannelState::Disconnected);
                return;
            }
        },
        _ = cancel.cancelled() => {
            transition(&state_tx, ChannelState::Disconnected);
            return;
        }
    };

    transition(&state_tx, ChannelState::Connected);
    let (mut sink, mut inbound) = stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                info!("telemetry channel closed on teardown");
                break;
            }
            message = inbound.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    apply_inbound(&text, &snapshot_tx, &counters);
                }
                Some(Ok(Message::Close(_))) => {
                    info!("telemetry channel closed by backend");
                    break;
                }
                // ping/pong are answered by the transport; binary frames
                // are not part of the contract
                Some(Ok(other)) => {
                    debug!("ignoring non-text inbound frame: {other:?}");
                }
                Some(Err(err)) => {
                    warn!("telemetry channel transport error: {err}");
                    break;
                }
                None => {
                    info!("telemetry channel stream ended");
                    break;
                }
            },
            frame = outbound_rx.recv() => match frame {
                Some(payload) => {
                    if let Err(err) = sink.send(Message::Text(payload)).await {
                        warn!("outbound frame send failed: {err}");
                        break;
                    }
                }
                // handle dropped without close(); tear down
                None => break,
            },
        }
    }

    transition(&state_tx, ChannelState::Disconnected);
}

/// Publish a state change, asserting the transition is one of the legal
/// edges of the lifecycle.
fn transition(state_tx: &watch::Sender<ChannelState>, next: ChannelState) {
    let current = *state_tx.borrow();
    if current == next {
        return;
    }
    debug_assert!(
        current.can_transition_to(next),
        "illegal channel transition {current} -> {next}"
    );
    info!("telemetry channel {current} -> {next}");
    state_tx.send_replace(next);
}

/// Parse one inbound text frame and replace the snapshot wholesale.
/// Malformed payloads leave the snapshot untouched, counted and logged.
pub(super) fn apply_inbound(
    text: &str,
    snapshot_tx: &watch::Sender<Option<TelemetrySnapshot>>,
    counters: &ChannelCounters,
) {
    match TelemetrySnapshot::parse(text) {
        Ok(snapshot) => {
            debug!("telemetry snapshot updated: {snapshot:?}");
            snapshot_tx.send_replace(Some(snapshot));
        }
        Err(err) => {
            let dropped = counters.malformed_drops.fetch_add(1, Ordering::Relaxed) + 1;
            warn!("dropping malformed telemetry message ({dropped} dropped so far): {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_inbound_leaves_snapshot_unchanged() {
        let prior = TelemetrySnapshot {
            emotion: Some("Focused".into()),
            gaze_alert: false,
            status: Some("active".into()),
            debug_msg: None,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(Some(prior.clone()));
        let counters = ChannelCounters::default();

        apply_inbound("{not json", &snapshot_tx, &counters);

        assert_eq!(*snapshot_rx.borrow(), Some(prior));
        assert_eq!(counters.malformed_drops.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn valid_inbound_replaces_snapshot_wholesale() {
        let prior = TelemetrySnapshot {
            emotion: Some("Focused".into()),
            gaze_alert: false,
            status: Some("active".into()),
            debug_msg: Some("stale".into()),
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(Some(prior));
        let counters = ChannelCounters::default();

        apply_inbound(r#"{"gaze_alert":true}"#, &snapshot_tx, &counters);

        let current = snapshot_rx.borrow().clone().unwrap();
        assert!(current.gaze_alert);
        // no merge with the prior snapshot
        assert_eq!(current.emotion, None);
        assert_eq!(current.debug_msg, None);
        assert_eq!(counters.malformed_drops.load(Ordering::Relaxed), 0);
    }
}
