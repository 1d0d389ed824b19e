use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::settings::RosterEntry;
use crate::telemetry::Emotion;

use super::model::{
    baseline_score, jittered_score, next_emotion, EngagementSample, StudentRecord, SCORE_JITTER,
};

/// Source of aggregated per-student telemetry for the dashboard.
///
/// The simulation below implements this; a live multi-student backend feed
/// would implement the same trait, leaving the view layer untouched.
pub trait EngagementFeed {
    /// Advance the feed by one tick at `now`.
    fn tick(&mut self, now: DateTime<Utc>);

    fn students(&self) -> &[StudentRecord];
}

/// Demo-mode stand-in for a live aggregated feed: per tick, each student
/// gets a jittered score around their classification's baseline, and the
/// classification itself drifts stochastically. The random source is
/// injected so tests can seed it.
pub struct SimulatedFeed<R: Rng> {
    students: Vec<StudentRecord>,
    rng: R,
}

impl<R: Rng> SimulatedFeed<R> {
    pub fn with_rng(roster: &[RosterEntry], rng: R) -> Self {
        let students = roster
            .iter()
            .map(|entry| StudentRecord::new(entry.id, entry.name.clone(), entry.emotion))
            .collect();
        Self { students, rng }
    }
}

impl SimulatedFeed<StdRng> {
    pub fn seeded(roster: &[RosterEntry], seed: u64) -> Self {
        Self::with_rng(roster, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(roster: &[RosterEntry]) -> Self {
        Self::with_rng(roster, StdRng::from_entropy())
    }
}

impl<R: Rng> EngagementFeed for SimulatedFeed<R> {
    fn tick(&mut self, now: DateTime<Utc>) {
        for student in &mut self.students {
            // score from the classification as it stands this tick
            let jitter = self.rng.gen_range(-SCORE_JITTER..=SCORE_JITTER);
            let score = jittered_score(baseline_score(student.emotion), jitter);
            student.push_sample(EngagementSample {
                timestamp: now,
                score,
            });

            let confusion_draw = self.rng.gen::<f64>();
            let recovery_draw = self.rng.gen::<f64>();
            student.emotion = next_emotion(student.emotion, confusion_draw, recovery_draw);
        }
    }
}
