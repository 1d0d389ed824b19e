use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use crate::telemetry::Emotion;

/// Sliding-window capacity for per-student score history.
pub const HISTORY_WINDOW: usize = 20;

/// Jitter magnitude applied to each baseline score.
pub const SCORE_JITTER: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngagementSample {
    pub timestamp: DateTime<Utc>,
    pub score: u8,
}

/// One monitored student on the dashboard: identity, current
/// classification, and a bounded FIFO of recent engagement scores.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub id: u32,
    pub name: String,
    pub emotion: Emotion,
    history: VecDeque<EngagementSample>,
}

impl StudentRecord {
    pub fn new(id: u32, name: impl Into<String>, emotion: Emotion) -> Self {
        Self {
            id,
            name: name.into(),
            emotion,
            history: VecDeque::with_capacity(HISTORY_WINDOW),
        }
    }

    /// Append a sample, evicting the oldest entry once the window is full.
    pub fn push_sample(&mut self, sample: EngagementSample) {
        if self.history.len() == HISTORY_WINDOW {
            self.history.pop_front();
        }
        self.history.push_back(sample);
    }

    pub fn history(&self) -> &VecDeque<EngagementSample> {
        &self.history
    }

    pub fn latest_score(&self) -> Option<u8> {
        self.history.back().map(|sample| sample.score)
    }
}

/// Target engagement baseline for a classification.
pub fn baseline_score(emotion: Emotion) -> i32 {
    match emotion {
        Emotion::Confused => 30,
        Emotion::HappySurprised => 80,
        Emotion::Focused | Emotion::Neutral => 60,
    }
}

/// Baseline plus jitter, clamped into the score range.
pub fn jittered_score(baseline: i32, jitter: i32) -> u8 {
    (baseline + jitter).clamp(0, 100) as u8
}

/// Stochastic per-tick classification shift, expressed over pre-drawn
/// uniform values in [0,1) so the kernel stays deterministic: a 5% chance
/// of turning Confused, otherwise a 10% chance of recovering to Focused.
pub fn next_emotion(current: Emotion, confusion_draw: f64, recovery_draw: f64) -> Emotion {
    if confusion_draw < 0.05 {
        Emotion::Confused
    } else if recovery_draw < 0.10 {
        Emotion::Focused
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(score: u8) -> EngagementSample {
        EngagementSample {
            timestamp: Utc::now(),
            score,
        }
    }

    #[test]
    fn history_grows_to_the_window_then_slides() {
        let mut record = StudentRecord::new(1, "Alex Chen", Emotion::Focused);

        for n in 1..=25u8 {
            record.push_sample(sample(n));
            assert_eq!(record.history().len(), usize::from(n).min(HISTORY_WINDOW));
        }

        // the 20 most recent samples, oldest first
        let scores: Vec<u8> = record.history().iter().map(|s| s.score).collect();
        assert_eq!(scores, (6..=25).collect::<Vec<u8>>());
        assert_eq!(record.latest_score(), Some(25));
    }

    #[test]
    fn scores_are_clamped_for_every_baseline_and_jitter() {
        for baseline in [30, 60, 80] {
            for jitter in -SCORE_JITTER..=SCORE_JITTER {
                let score = jittered_score(baseline, jitter);
                assert!((0..=100).contains(&score));
            }
        }
        // clamp edges
        assert_eq!(jittered_score(0, -10), 0);
        assert_eq!(jittered_score(100, 10), 100);
    }

    #[test]
    fn baselines_follow_the_classification() {
        assert_eq!(baseline_score(Emotion::Confused), 30);
        assert_eq!(baseline_score(Emotion::HappySurprised), 80);
        assert_eq!(baseline_score(Emotion::Focused), 60);
        assert_eq!(baseline_score(Emotion::Neutral), 60);
    }

    #[test]
    fn emotion_transitions_are_deterministic_over_draws() {
        // forced confusion
        assert_eq!(
            next_emotion(Emotion::Focused, 0.01, 0.99),
            Emotion::Confused
        );
        // forced recovery
        assert_eq!(
            next_emotion(Emotion::Confused, 0.50, 0.05),
            Emotion::Focused
        );
        // forced hold
        assert_eq!(
            next_emotion(Emotion::HappySurprised, 0.50, 0.50),
            Emotion::HappySurprised
        );
        // confusion wins over recovery
        assert_eq!(
            next_emotion(Emotion::Focused, 0.01, 0.01),
            Emotion::Confused
        );
    }
}
