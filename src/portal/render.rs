use chrono::{DateTime, Utc};

use crate::channel::ChannelState;
use crate::telemetry::{Emotion, TelemetrySnapshot};

/// Pure view model for the student portal: everything the terminal
/// renderer prints, derived from the channel state and the latest
/// snapshot. No smoothing — a single snapshot flip toggles the alert.
#[derive(Debug, Clone, PartialEq)]
pub struct PortalRender {
    pub status_text: &'static str,
    pub connected: bool,
    pub emotion_text: String,
    pub integrity_text: &'static str,
    pub alert_overlay: bool,
    pub console: Vec<String>,
}

impl PortalRender {
    pub fn compose(
        state: ChannelState,
        snapshot: Option<&TelemetrySnapshot>,
        now: DateTime<Utc>,
    ) -> Self {
        let connected = state.is_connected();
        let alert_overlay = snapshot.map_or(false, |s| s.gaze_alert);

        let emotion_text = snapshot
            .and_then(|s| s.emotion.clone())
            .unwrap_or_else(|| "Initializing...".into());

        let mut console = vec![
            "> System initialized...".to_string(),
            "> Camera stream connected.".to_string(),
        ];
        if let Some(snapshot) = snapshot {
            console.push(format!(
                "> [{}] Status: {} | Msg: {}",
                now.format("%H:%M:%S"),
                snapshot.status.as_deref().unwrap_or("-"),
                snapshot.debug_msg.as_deref().unwrap_or("-"),
            ));
            if snapshot.emotion() == Some(Emotion::Confused) {
                console.push(
                    "> [DETECTED] Confusion Metric > Threshold (Brow Furrow Detected)".to_string(),
                );
            }
        }

        Self {
            status_text: if connected {
                "Live ML Connection"
            } else {
                "Connecting..."
            },
            connected,
            emotion_text,
            integrity_text: if alert_overlay { "Flagged" } else { "Clear" },
            alert_overlay,
            console,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confused_snapshot() -> TelemetrySnapshot {
        TelemetrySnapshot::parse(
            r#"{"emotion":"Confused","gaze_alert":true,"status":"ok","debug_msg":"brow"}"#,
        )
        .unwrap()
    }

    #[test]
    fn gaze_alert_raises_overlay_and_flags_integrity() {
        let snapshot = confused_snapshot();
        let render = PortalRender::compose(ChannelState::Connected, Some(&snapshot), Utc::now());

        assert!(render.alert_overlay);
        assert_eq!(render.integrity_text, "Flagged");
        assert_eq!(render.emotion_text, "Confused");
        assert_eq!(render.status_text, "Live ML Connection");
        assert!(render
            .console
            .iter()
            .any(|line| line.contains("Confusion Metric")));
    }

    #[test]
    fn no_snapshot_renders_fallbacks() {
        let render = PortalRender::compose(ChannelState::Connecting, None, Utc::now());

        assert!(!render.alert_overlay);
        assert_eq!(render.status_text, "Connecting...");
        assert_eq!(render.emotion_text, "Initializing...");
        assert_eq!(render.integrity_text, "Clear");
        assert_eq!(render.console.len(), 2);
    }

    #[test]
    fn alert_clears_instantly_with_the_next_snapshot() {
        let mut snapshot = confused_snapshot();
        let render = PortalRender::compose(ChannelState::Connected, Some(&snapshot), Utc::now());
        assert!(render.alert_overlay);

        snapshot.gaze_alert = false;
        let render = PortalRender::compose(ChannelState::Connected, Some(&snapshot), Utc::now());
        assert!(!render.alert_overlay);
        assert_eq!(render.integrity_text, "Clear");
    }

    #[test]
    fn disconnected_channel_shows_connecting_badge() {
        let snapshot = confused_snapshot();
        let render = PortalRender::compose(ChannelState::Disconnected, Some(&snapshot), Utc::now());
        assert!(!render.connected);
        assert_eq!(render.status_text, "Connecting...");
    }

    #[test]
    fn missing_status_fields_render_as_fallback_text() {
        let snapshot = TelemetrySnapshot::parse(r#"{"emotion":"Neutral"}"#).unwrap();
        let render = PortalRender::compose(ChannelState::Connected, Some(&snapshot), Utc::now());
        assert!(render
            .console
            .iter()
            .any(|line| line.contains("Status: - | Msg: -")));
    }
}
