//! Mission session state machine and scoring.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::content::{MissionContent, Response, SessionItem};

/// Lifecycle phase of a session.
///
/// Replaces the scattered `missionCompleted` / `questionAnswered` flags of
/// older builds with explicit transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Created without any items; only completion for a zero outcome remains.
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Result of a single `answer` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub points_awarded: u32,
    /// True when this answer consumed the final item.
    pub finished: bool,
}

impl AnswerOutcome {
    const fn no_op() -> Self {
        Self {
            correct: false,
            points_awarded: 0,
            finished: false,
        }
    }
}

/// Final report handed to the progress store exactly once per session.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionOutcome {
    pub mission_id: String,
    pub accumulated_points: u32,
    pub correct_count: u32,
    /// Score as a percentage of the maximum attainable points, in `[0, 100]`.
    pub score_percent: f64,
}

/// Mid-session scratch blob persisted between scenes and removed once the
/// session finalizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSnapshot {
    pub current_index: usize,
    pub points: u32,
    pub correct_answers: u32,
    pub max_score: u32,
    pub total_questions: usize,
}

/// One live playthrough of a mission's item sequence.
#[derive(Debug, Clone)]
pub struct MissionSession {
    mission_id: String,
    items: Vec<SessionItem>,
    current_index: usize,
    accumulated_points: u32,
    correct_count: u32,
    phase: SessionPhase,
}

impl MissionSession {
    /// Start a session over the mission's items in content order.
    #[must_use]
    pub fn new(content: &MissionContent) -> Self {
        Self::from_items(content.mission_id.clone(), content.items.clone())
    }

    /// Start a session with the item order shuffled deterministically by `seed`.
    #[must_use]
    pub fn new_shuffled(content: &MissionContent, seed: u64) -> Self {
        let mut items = content.items.clone();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        items.shuffle(&mut rng);
        Self::from_items(content.mission_id.clone(), items)
    }

    /// Resume a session from a persisted snapshot.
    ///
    /// Out-of-range snapshot values clamp to the content rather than fail;
    /// a stale blob must never block starting the mission.
    #[must_use]
    pub fn resume(content: &MissionContent, snapshot: &SessionSnapshot) -> Self {
        let mut session = Self::new(content);
        session.current_index = snapshot.current_index.min(session.items.len());
        session.accumulated_points = snapshot.points.min(session.max_points());
        session.correct_count = snapshot
            .correct_answers
            .min(u32::try_from(session.items.len()).unwrap_or(u32::MAX));
        session
    }

    fn from_items(mission_id: String, items: Vec<SessionItem>) -> Self {
        let phase = if items.is_empty() {
            SessionPhase::NotStarted
        } else {
            SessionPhase::InProgress
        };
        Self {
            mission_id,
            items,
            current_index: 0,
            accumulated_points: 0,
            correct_count: 0,
            phase,
        }
    }

    #[must_use]
    pub fn mission_id(&self) -> &str {
        &self.mission_id
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub const fn accumulated_points(&self) -> u32 {
        self.accumulated_points
    }

    #[must_use]
    pub const fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// The item awaiting a response, if any remain.
    #[must_use]
    pub fn current_item(&self) -> Option<&SessionItem> {
        self.items.get(self.current_index)
    }

    /// Maximum points attainable across all items.
    #[must_use]
    pub fn max_points(&self) -> u32 {
        self.items
            .iter()
            .map(SessionItem::points)
            .fold(0, u32::saturating_add)
    }

    /// Submit a response for the current item.
    ///
    /// Advances exactly one item regardless of correctness; a correct
    /// response adds the item's points. Calls past the final item, or on a
    /// session that never started, are defensive no-ops reporting
    /// `correct: false`.
    pub fn answer(&mut self, response: &Response) -> AnswerOutcome {
        if self.phase != SessionPhase::InProgress || self.current_index >= self.items.len() {
            return AnswerOutcome::no_op();
        }
        let item = &self.items[self.current_index];
        let correct = item.accepts(response);
        let points_awarded = if correct { item.points() } else { 0 };
        if correct {
            self.accumulated_points = self.accumulated_points.saturating_add(points_awarded);
            self.correct_count += 1;
        }
        self.current_index += 1;
        AnswerOutcome {
            correct,
            points_awarded,
            finished: self.current_index == self.items.len(),
        }
    }

    /// Session score as a percentage of the maximum attainable points.
    ///
    /// An empty session reports 0.
    #[must_use]
    pub fn score_percent(&self) -> f64 {
        let max = self.max_points();
        if max == 0 {
            return 0.0;
        }
        f64::from(self.accumulated_points) / f64::from(max) * 100.0
    }

    /// Transition to `Completed` and emit the outcome.
    ///
    /// Covers both natural completion (all items consumed) and the explicit
    /// force-complete signal used by open-ended task missions. Idempotent:
    /// the outcome is produced exactly once, so a duplicate UI event cannot
    /// double-report to the progress store.
    pub fn complete(&mut self) -> Option<MissionOutcome> {
        if self.phase == SessionPhase::Completed {
            return None;
        }
        self.phase = SessionPhase::Completed;
        Some(MissionOutcome {
            mission_id: self.mission_id.clone(),
            accumulated_points: self.accumulated_points,
            correct_count: self.correct_count,
            score_percent: self.score_percent(),
        })
    }

    /// Complete only once the final item has been consumed; `None` until then.
    pub fn complete_if_finished(&mut self) -> Option<MissionOutcome> {
        if self.phase == SessionPhase::InProgress && self.current_index == self.items.len() {
            self.complete()
        } else {
            None
        }
    }

    /// Scratch blob for mid-session persistence.
    #[must_use]
    pub fn checkpoint(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_index: self.current_index,
            points: self.accumulated_points,
            correct_answers: self.correct_count,
            max_score: self.max_points(),
            total_questions: self.items.len(),
        }
    }
}
