use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::telemetry::Emotion;

/// A dashboard roster entry: one monitored student identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub emotion: Emotion,
}

/// Client configuration, persisted as JSON next to the binary.
///
/// Every knob defaults to the values the backend contract was built
/// against (320x240 JPEG at quality 50, 5 Hz sampling, port 8000).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    pub backend_host: String,
    pub backend_port: u16,
    pub student_id: String,
    pub sample_interval_ms: u64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub jpeg_quality: u8,
    pub camera_retry_delay_ms: u64,
    pub dashboard_tick_ms: u64,
    pub roster: Vec<RosterEntry>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_host: "localhost".into(),
            backend_port: 8000,
            student_id: "student_1".into(),
            sample_interval_ms: 200,
            frame_width: 320,
            frame_height: 240,
            jpeg_quality: 50,
            camera_retry_delay_ms: 1000,
            dashboard_tick_ms: 1000,
            roster: vec![
                RosterEntry {
                    id: 1,
                    name: "Alex Chen".into(),
                    emotion: Emotion::Focused,
                },
                RosterEntry {
                    id: 2,
                    name: "Sarah Jones".into(),
                    emotion: Emotion::Confused,
                },
                RosterEntry {
                    id: 3,
                    name: "Mike Ross".into(),
                    emotion: Emotion::Focused,
                },
            ],
        }
    }
}

impl ClientSettings {
    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unreadable as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        match serde_json::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!(
                    "settings file {} is not valid JSON ({err}); using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Persist the settings as pretty-printed JSON at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Backend connection target for one student identity.
    pub fn endpoint(&self, student_id: &str) -> String {
        format!(
            "ws://{}:{}/ws/{}",
            self.backend_host, self.backend_port, student_id
        )
    }
}
