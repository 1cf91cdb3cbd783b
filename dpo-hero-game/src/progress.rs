//! Persistent player progress and the store that mediates every mutation.

use serde::{Deserialize, Serialize};

use crate::ProgressStorage;
use crate::catalog::MissionCatalog;
use crate::level::level_for_points;

/// Persisted player state, written as the `dpoHeroProgress` blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerProgress {
    /// Mission ids completed at least once, in completion order.
    pub completed_missions: Vec<String>,
    pub current_points: u32,
    /// Derived from `current_points`; stored for display and repaired on load.
    pub level: u32,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            completed_missions: Vec::new(),
            current_points: 0,
            level: 1,
        }
    }
}

impl PlayerProgress {
    /// Whether the mission has been completed at least once.
    #[must_use]
    pub fn is_completed(&self, mission_id: &str) -> bool {
        self.completed_missions.iter().any(|id| id == mission_id)
    }

    /// Recompute the derived level from points; true when it changed.
    fn reconcile_level(&mut self) -> bool {
        let computed = level_for_points(self.current_points);
        if computed == self.level {
            return false;
        }
        self.level = computed;
        true
    }
}

/// How the persisted blob was obtained when the store opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No blob existed; defaults created.
    Fresh,
    /// Blob read and deserialized cleanly.
    Loaded,
    /// Storage failed or the blob was unreadable; defaults substituted.
    Recovered,
}

/// Result of a `complete_mission` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReceipt {
    pub first_time: bool,
    /// Points added by this call; zero on a replay.
    pub points_awarded: u32,
    pub total_points: u32,
    pub level: u32,
    /// True when this completion crossed a level threshold.
    pub leveled_up: bool,
    /// False when the write-back failed and the state is memory-only.
    pub persisted: bool,
}

/// Single authoritative holder of `PlayerProgress`.
///
/// All mutations go through `complete_mission`, which rewrites the full blob
/// after every change. Persistence failures degrade to an in-memory session
/// rather than surfacing to the caller.
pub struct ProgressStore<S> {
    storage: S,
    progress: PlayerProgress,
}

impl<S: ProgressStorage> ProgressStore<S> {
    /// Open the store, recovering to defaults when the blob is absent or
    /// unreadable. Never fails the caller.
    pub fn open(storage: S) -> (Self, LoadOutcome) {
        let (progress, outcome) = match storage.load_progress() {
            Ok(Some(mut progress)) => {
                if progress.reconcile_level() {
                    log::info!(
                        "repaired stored level to match {} points",
                        progress.current_points
                    );
                }
                (progress, LoadOutcome::Loaded)
            }
            Ok(None) => (PlayerProgress::default(), LoadOutcome::Fresh),
            Err(err) => {
                log::warn!("progress blob unreadable, starting from defaults: {err}");
                (PlayerProgress::default(), LoadOutcome::Recovered)
            }
        };
        (Self { storage, progress }, outcome)
    }

    #[must_use]
    pub const fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Record a mission completion and persist the updated blob.
    ///
    /// Replays of an already-completed mission mutate nothing and report
    /// `first_time: false`, so practice runs never double-award points.
    pub fn complete_mission(&mut self, mission_id: &str, earned_points: u32) -> CompletionReceipt {
        if self.progress.is_completed(mission_id) {
            return CompletionReceipt {
                first_time: false,
                points_awarded: 0,
                total_points: self.progress.current_points,
                level: self.progress.level,
                leveled_up: false,
                persisted: true,
            };
        }

        let level_before = self.progress.level;
        self.progress.completed_missions.push(mission_id.to_string());
        self.progress.current_points =
            self.progress.current_points.saturating_add(earned_points);
        self.progress.reconcile_level();
        let persisted = self.persist();

        CompletionReceipt {
            first_time: true,
            points_awarded: earned_points,
            total_points: self.progress.current_points,
            level: self.progress.level,
            leveled_up: self.progress.level > level_before,
            persisted,
        }
    }

    /// Ids currently startable against the live completed set, catalog order.
    #[must_use]
    pub fn unlocked_missions(&self, catalog: &MissionCatalog) -> Vec<String> {
        catalog.unlocked_ids(&self.progress.completed_missions)
    }

    /// Write the full blob back; failure is logged, never propagated.
    fn persist(&mut self) -> bool {
        match self.storage.save_progress(&self.progress) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to persist progress, continuing in memory: {err}");
                false
            }
        }
    }
}
