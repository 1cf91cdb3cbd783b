//! Display-ready progress summary for the persistent HUD.

use crate::level::threshold;
use crate::progress::PlayerProgress;

/// Plain display data computed from `PlayerProgress`; the presentation layer
/// renders it and nothing here touches the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSummary {
    pub total_points: u32,
    pub level: u32,
    pub completed_count: usize,
    /// Points earned past the current level's threshold.
    pub points_into_level: u32,
    /// Points still needed for the next level.
    pub points_to_next_level: u32,
    /// Progress toward the next level in `[0, 100]`.
    pub level_progress_pct: f64,
}

impl PlayerProgress {
    /// Snapshot of the derived display values.
    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        let floor = threshold(self.level);
        let ceiling = threshold(self.level + 1);
        let into = self.current_points.saturating_sub(floor);
        let span = ceiling.saturating_sub(floor);
        let pct = if span == 0 {
            100.0
        } else {
            f64::from(into) / f64::from(span) * 100.0
        };
        ProgressSummary {
            total_points: self.current_points,
            level: self.level,
            completed_count: self.completed_missions.len(),
            points_into_level: into,
            points_to_next_level: ceiling.saturating_sub(self.current_points),
            level_progress_pct: pct.min(100.0),
        }
    }
}
