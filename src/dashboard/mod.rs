mod model;
mod simulation;

pub use model::{
    baseline_score, jittered_score, next_emotion, EngagementSample, StudentRecord, HISTORY_WINDOW,
};
pub use simulation::{EngagementFeed, SimulatedFeed};

use anyhow::Result;
use chrono::Utc;
use log::info;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::settings::ClientSettings;
use crate::telemetry::Emotion;

/// Classroom-level rollup shown in the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub present: usize,
    pub engagement_pct: u32,
    pub confused_count: usize,
}

pub fn summarize(students: &[StudentRecord]) -> DashboardSummary {
    let scores: Vec<u32> = students
        .iter()
        .filter_map(|s| s.latest_score().map(u32::from))
        .collect();
    let engagement_pct = if scores.is_empty() {
        0
    } else {
        scores.iter().sum::<u32>() / scores.len() as u32
    };

    DashboardSummary {
        present: students.len(),
        engagement_pct,
        confused_count: students
            .iter()
            .filter(|s| s.emotion == Emotion::Confused)
            .count(),
    }
}

const SPARK_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render a score history as a one-line sparkline, oldest sample first.
/// Scores above 100 saturate at the top glyph; feeds are not required to
/// pre-clamp.
pub fn sparkline(samples: impl Iterator<Item = u8>) -> String {
    samples
        .map(|score| {
            let bucket = ((usize::from(score) * (SPARK_GLYPHS.len() - 1)) / 100)
                .min(SPARK_GLYPHS.len() - 1);
            SPARK_GLYPHS[bucket]
        })
        .collect()
}

/// Teacher dashboard view: drive the engagement feed on a fixed 1-second
/// tick and render the rollup until `cancel` fires.
pub async fn run_dashboard(settings: &ClientSettings, cancel: CancellationToken) -> Result<()> {
    let mut feed = SimulatedFeed::from_entropy(&settings.roster);
    info!(
        "teacher dashboard mounted ({} students, simulated feed)",
        settings.roster.len()
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(settings.dashboard_tick_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                feed.tick(Utc::now());
                render(feed.students());
            }
        }
    }

    info!("teacher dashboard unmounted");
    Ok(())
}

fn render(students: &[StudentRecord]) {
    let summary = summarize(students);
    println!(
        "Classroom Session: MATH-101 | {} present | engagement {}% | {} confused",
        summary.present, summary.engagement_pct, summary.confused_count
    );

    for student in students {
        println!(
            "  #{:<3} {:<12} {:<15} {:>3} {}",
            student.id,
            student.name,
            student.emotion.to_string(),
            student
                .latest_score()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".into()),
            sparkline(student.history().iter().map(|s| s.score)),
        );
        if student.emotion == Emotion::Confused {
            println!("       ! persistent furrowing detected");
        }
    }
}
