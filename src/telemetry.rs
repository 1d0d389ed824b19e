use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Engagement classification shared by the student view and the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Emotion {
    Focused,
    Confused,
    #[serde(rename = "Happy/Surprised")]
    HappySurprised,
    Neutral,
}

impl Default for Emotion {
    fn default() -> Self {
        Emotion::Focused
    }
}

impl Emotion {
    /// Map a backend emotion label onto a classification.
    ///
    /// The inference backend emits free-form labels ("Confused / Frowning",
    /// "Surprised", ...), so matching is tolerant. Labels with no known
    /// classification yield `None`.
    pub fn from_label(label: &str) -> Option<Emotion> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        let lower = label.to_ascii_lowercase();
        if lower.contains("confused") || lower.contains("frown") {
            Some(Emotion::Confused)
        } else if lower.contains("happy") || lower.contains("surprised") {
            Some(Emotion::HappySurprised)
        } else if lower.contains("focused") {
            Some(Emotion::Focused)
        } else if lower.contains("neutral") {
            Some(Emotion::Neutral)
        } else {
            None
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Emotion::Focused => "Focused",
            Emotion::Confused => "Confused",
            Emotion::HappySurprised => "Happy/Surprised",
            Emotion::Neutral => "Neutral",
        };
        f.write_str(text)
    }
}

/// Latest inbound inference result. Replaced wholesale on every message;
/// absent until the backend has answered at least once.
///
/// Field names follow the backend wire format; every field is optional so
/// partial messages still deserialize (missing fields render as fallback
/// text in the views).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub gaze_alert: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub debug_msg: Option<String>,
}

impl TelemetrySnapshot {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Classification of the raw emotion label, if it maps to one.
    pub fn emotion(&self) -> Option<Emotion> {
        self.emotion.as_deref().and_then(Emotion::from_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_message() {
        let snapshot = TelemetrySnapshot::parse(
            r#"{"emotion":"Confused","gaze_alert":true,"status":"ok","debug_msg":"brow"}"#,
        )
        .unwrap();

        assert_eq!(snapshot.emotion.as_deref(), Some("Confused"));
        assert!(snapshot.gaze_alert);
        assert_eq!(snapshot.status.as_deref(), Some("ok"));
        assert_eq!(snapshot.debug_msg.as_deref(), Some("brow"));
        assert_eq!(snapshot.emotion(), Some(Emotion::Confused));
    }

    #[test]
    fn missing_fields_deserialize_as_absent() {
        let snapshot = TelemetrySnapshot::parse(r#"{"status":"active"}"#).unwrap();

        assert_eq!(snapshot.emotion, None);
        assert!(!snapshot.gaze_alert);
        assert_eq!(snapshot.debug_msg, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let snapshot =
            TelemetrySnapshot::parse(r#"{"emotion":"Neutral","confidence":0.93}"#).unwrap();
        assert_eq!(snapshot.emotion(), Some(Emotion::Neutral));
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(TelemetrySnapshot::parse("definitely not json").is_err());
        assert!(TelemetrySnapshot::parse("").is_err());
    }

    #[test]
    fn label_mapping_is_tolerant() {
        assert_eq!(
            Emotion::from_label("Confused / Frowning"),
            Some(Emotion::Confused)
        );
        assert_eq!(Emotion::from_label("Surprised"), Some(Emotion::HappySurprised));
        assert_eq!(Emotion::from_label("Focused"), Some(Emotion::Focused));
        assert_eq!(Emotion::from_label("Neutral"), Some(Emotion::Neutral));
        assert_eq!(Emotion::from_label("Talking"), None);
        assert_eq!(Emotion::from_label(""), None);
    }

    #[test]
    fn display_matches_dashboard_labels() {
        assert_eq!(Emotion::HappySurprised.to_string(), "Happy/Surprised");
        assert_eq!(Emotion::Confused.to_string(), "Confused");
    }
}
