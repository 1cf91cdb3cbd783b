//! DPO Hero Core
//!
//! Platform-agnostic progression logic for the DPO Hero educational game.
//! This crate provides the mission catalog, player progress store, and
//! session scoring without UI or platform-specific dependencies.

pub mod catalog;
pub mod constants;
pub mod content;
pub mod level;
pub mod progress;
pub mod session;
pub mod summary;

// Re-export commonly used types
pub use catalog::{CatalogError, MissionCatalog, MissionDefinition, RewardRule, scale_by_percent};
pub use constants::{
    LAST_SCENE_STORAGE_KEY, LEVEL_COST_STEP, PROGRESS_STORAGE_KEY, SESSION_STORAGE_KEY,
};
pub use content::{ContentData, MissionContent, Response, SessionItem};
pub use level::{level_for_points, points_into_level, points_to_next_level, threshold};
pub use progress::{CompletionReceipt, LoadOutcome, PlayerProgress, ProgressStore};
pub use session::{
    AnswerOutcome, MissionOutcome, MissionSession, SessionPhase, SessionSnapshot,
};
pub use summary::ProgressSummary;

/// Trait for abstracting static content loading.
/// Platform-specific implementations should provide this.
pub trait ContentLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the mission catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error>;

    /// Load the full quiz/task content set.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be loaded or parsed.
    fn load_content(&self) -> Result<ContentData, Self::Error>;
}

/// Trait for abstracting progress and session-scratch persistence.
/// Platform-specific implementations should provide this.
pub trait ProgressStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the persisted progress blob; `None` when no blob exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob exists but cannot be read or parsed.
    fn load_progress(&self) -> Result<Option<PlayerProgress>, Self::Error>;

    /// Persist the full progress blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn save_progress(&self, progress: &PlayerProgress) -> Result<(), Self::Error>;

    /// Load the mid-session scratch blob, if one was checkpointed.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob exists but cannot be read or parsed.
    fn load_session(&self) -> Result<Option<SessionSnapshot>, Self::Error>;

    /// Persist the mid-session scratch blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn save_session(&self, snapshot: &SessionSnapshot) -> Result<(), Self::Error>;

    /// Remove the session scratch blob once a session finalizes.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be removed.
    fn clear_session(&self) -> Result<(), Self::Error>;
}

/// Errors from starting a mission session.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StartMissionError {
    #[error("unknown mission: {id}")]
    UnknownMission { id: String },
    #[error("mission '{id}' is locked; missing prerequisites: {missing:?}")]
    Locked { id: String, missing: Vec<String> },
    #[error("no content available for mission: {id}")]
    ContentUnavailable { id: String },
}

/// Result of handing a finished session back to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishStatus {
    /// First completion of this session; the receipt describes the
    /// committed award.
    Recorded(CompletionReceipt),
    /// The session already reported; nothing was committed.
    AlreadyReported,
    /// The outcome referenced a mission id outside the catalog; soft no-op.
    UnknownMission,
}

/// Main engine wiring content loading, progress persistence, and sessions.
///
/// Scenes hold one engine for the lifetime of the app and call into it from
/// their event handlers; everything returned is plain data.
pub struct MissionEngine<S>
where
    S: ProgressStorage,
{
    catalog: MissionCatalog,
    content: ContentData,
    store: ProgressStore<S>,
    load_outcome: LoadOutcome,
}

impl<S> MissionEngine<S>
where
    S: ProgressStorage,
{
    /// Load the catalog and content through `loader` and open the progress
    /// store.
    ///
    /// # Errors
    ///
    /// Returns an error when the static assets cannot be loaded or fail
    /// validation. Progress-blob problems never fail this call; they resolve
    /// to defaults (see [`LoadOutcome`]).
    pub fn open<L: ContentLoader>(loader: &L, storage: S) -> Result<Self, L::Error> {
        let catalog = loader.load_catalog()?;
        let content = loader.load_content()?;
        let (store, load_outcome) = ProgressStore::open(storage);
        Ok(Self {
            catalog,
            content,
            store,
            load_outcome,
        })
    }

    #[must_use]
    pub const fn catalog(&self) -> &MissionCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn progress(&self) -> &PlayerProgress {
        self.store.progress()
    }

    #[must_use]
    pub const fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    /// Ids currently startable, catalog order; completed missions stay
    /// startable as replays.
    #[must_use]
    pub fn unlocked_missions(&self) -> Vec<String> {
        self.store.unlocked_missions(&self.catalog)
    }

    /// Display data for the persistent HUD.
    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        self.progress().summary()
    }

    /// Start a session for an unlocked mission, items in content order.
    ///
    /// # Errors
    ///
    /// Returns an error when the mission is unknown, still locked, or has no
    /// content.
    pub fn start_mission(&self, mission_id: &str) -> Result<MissionSession, StartMissionError> {
        self.resolve_content(mission_id).map(MissionSession::new)
    }

    /// Start a session with the item order shuffled deterministically by
    /// `seed`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::start_mission`].
    pub fn start_mission_shuffled(
        &self,
        mission_id: &str,
        seed: u64,
    ) -> Result<MissionSession, StartMissionError> {
        self.resolve_content(mission_id)
            .map(|content| MissionSession::new_shuffled(content, seed))
    }

    /// Start a session, resuming from a checkpointed scratch blob when one
    /// exists. A missing or unreadable blob falls back to a fresh session.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::start_mission`].
    pub fn resume_or_start(&self, mission_id: &str) -> Result<MissionSession, StartMissionError> {
        let content = self.resolve_content(mission_id)?;
        match self.store.storage().load_session() {
            Ok(Some(snapshot)) => Ok(MissionSession::resume(content, &snapshot)),
            Ok(None) => Ok(MissionSession::new(content)),
            Err(err) => {
                log::warn!("session scratch unreadable, starting fresh: {err}");
                Ok(MissionSession::new(content))
            }
        }
    }

    /// Persist the session's scratch blob; failure is logged, never
    /// propagated. Returns whether the write succeeded.
    pub fn checkpoint_session(&self, session: &MissionSession) -> bool {
        match self.store.storage().save_session(&session.checkpoint()) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to checkpoint session: {err}");
                false
            }
        }
    }

    /// Finalize a session and commit its outcome to the progress store.
    ///
    /// Applies the mission's reward rule, records the completion, and
    /// removes the session scratch blob. Duplicate calls and unknown
    /// mission ids are soft no-ops.
    pub fn finish_mission(&mut self, session: &mut MissionSession) -> FinishStatus {
        let Some(outcome) = session.complete() else {
            return FinishStatus::AlreadyReported;
        };
        let Some(def) = self.catalog.find(&outcome.mission_id) else {
            log::warn!(
                "finished session for unknown mission '{}'; nothing committed",
                outcome.mission_id
            );
            return FinishStatus::UnknownMission;
        };
        let earned = def.reward.earned_points(def.points, &outcome);
        let receipt = self.store.complete_mission(&outcome.mission_id, earned);
        if let Err(err) = self.store.storage().clear_session() {
            log::warn!("failed to clear session scratch: {err}");
        }
        FinishStatus::Recorded(receipt)
    }

    fn resolve_content(&self, mission_id: &str) -> Result<&MissionContent, StartMissionError> {
        let def = self
            .catalog
            .find(mission_id)
            .ok_or_else(|| StartMissionError::UnknownMission {
                id: mission_id.to_string(),
            })?;
        let completed = &self.progress().completed_missions;
        if !def.is_unlocked(completed) {
            let missing = def
                .required_missions
                .iter()
                .filter(|req| !completed.contains(*req))
                .cloned()
                .collect();
            return Err(StartMissionError::Locked {
                id: mission_id.to_string(),
                missing,
            });
        }
        self.content
            .find(mission_id)
            .ok_or_else(|| StartMissionError::ContentUnavailable {
                id: mission_id.to_string(),
            })
    }
}
