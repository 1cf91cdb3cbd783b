//! Seeded playthrough simulation over the embedded catalog and content.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use dpo_hero_game::{
    CatalogError, ContentData, ContentLoader, FinishStatus, MissionCatalog, MissionEngine,
    PlayerProgress, ProgressStorage, Response, SessionItem, SessionSnapshot, level_for_points,
};

/// Errors while loading the embedded assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("content JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Loader over the same assets the web build embeds.
pub struct EmbeddedLoader;

impl ContentLoader for EmbeddedLoader {
    type Error = AssetError;

    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error> {
        let json = include_str!("../../assets/data/missions.json");
        MissionCatalog::from_json(json).map_err(AssetError::Catalog)
    }

    fn load_content(&self) -> Result<ContentData, Self::Error> {
        let json = include_str!("../../assets/data/content.json");
        ContentData::from_json(json).map_err(AssetError::Json)
    }
}

/// In-memory storage standing in for the browser's localStorage.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    progress: Rc<RefCell<Option<PlayerProgress>>>,
    session: Rc<RefCell<Option<SessionSnapshot>>>,
}

impl ProgressStorage for MemoryStorage {
    type Error = Infallible;

    fn load_progress(&self) -> Result<Option<PlayerProgress>, Self::Error> {
        Ok(self.progress.borrow().clone())
    }

    fn save_progress(&self, progress: &PlayerProgress) -> Result<(), Self::Error> {
        *self.progress.borrow_mut() = Some(progress.clone());
        Ok(())
    }

    fn load_session(&self) -> Result<Option<SessionSnapshot>, Self::Error> {
        Ok(*self.session.borrow())
    }

    fn save_session(&self, snapshot: &SessionSnapshot) -> Result<(), Self::Error> {
        *self.session.borrow_mut() = Some(*snapshot);
        Ok(())
    }

    fn clear_session(&self) -> Result<(), Self::Error> {
        *self.session.borrow_mut() = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub runs: usize,
    pub base_seed: u64,
    /// Probability of answering a question correctly, in percent.
    pub accuracy_pct: u8,
}

/// Result of one simulated playthrough.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub seed: u64,
    pub completed: usize,
    pub final_points: u32,
    pub final_level: u32,
}

/// Aggregated outcome of a simulation batch.
#[derive(Debug, Default)]
pub struct SimReport {
    pub runs: Vec<RunRecord>,
    /// Invariant violations observed across all runs; empty on a clean pass.
    pub violations: Vec<String>,
}

impl SimReport {
    #[must_use]
    pub fn points_range(&self) -> (u32, u32) {
        let min = self.runs.iter().map(|r| r.final_points).min().unwrap_or(0);
        let max = self.runs.iter().map(|r| r.final_points).max().unwrap_or(0);
        (min, max)
    }
}

/// Run `config.runs` seeded playthroughs, checking the progression
/// invariants after every mutation.
///
/// # Errors
///
/// Returns an error when the embedded assets fail to load.
pub fn run_simulations(config: &SimConfig) -> Result<SimReport, AssetError> {
    let mut report = SimReport::default();
    for run in 0..config.runs {
        let seed = config.base_seed.wrapping_add(run as u64);
        let record = run_playthrough(seed, config.accuracy_pct, &mut report.violations)?;
        log::debug!(
            "run {run}: seed {}, {} missions, {} points, level {}",
            record.seed,
            record.completed,
            record.final_points,
            record.final_level
        );
        report.runs.push(record);
    }
    Ok(report)
}

fn run_playthrough(
    seed: u64,
    accuracy_pct: u8,
    violations: &mut Vec<String>,
) -> Result<RunRecord, AssetError> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut engine = MissionEngine::open(&EmbeddedLoader, MemoryStorage::default())?;

    let mut check = |label: &str, ok: bool| {
        if !ok {
            violations.push(format!("seed {seed}: {label}"));
        }
    };

    let mut last_points = 0_u32;
    let mut last_unlocked: Vec<String> = engine.unlocked_missions();

    loop {
        let next = engine
            .unlocked_missions()
            .into_iter()
            .find(|id| !engine.progress().is_completed(id));
        let Some(id) = next else { break };

        let mut session = match engine.start_mission_shuffled(&id, rng.r#gen()) {
            Ok(session) => session,
            Err(err) => {
                check(&format!("start of '{id}' failed: {err}"), false);
                break;
            }
        };
        while let Some(item) = session.current_item() {
            let response = match item {
                SessionItem::Question { answer, options, .. } => {
                    if rng.gen_range(0..100) < u32::from(accuracy_pct) {
                        Response::Choice(*answer)
                    } else {
                        Response::Choice((*answer + 1) % options.len().max(1))
                    }
                }
                SessionItem::Task { .. } => Response::TaskDone,
            };
            session.answer(&response);
            let pct = session.score_percent();
            check("score percent out of bounds", (0.0..=100.0).contains(&pct));
        }

        let status = engine.finish_mission(&mut session);
        let FinishStatus::Recorded(receipt) = status else {
            check("first finish was not recorded", false);
            break;
        };
        check("replayed mission re-awarded", receipt.first_time);
        check("points decreased", receipt.total_points >= last_points);
        check(
            "level drifted from the formula",
            receipt.level == level_for_points(receipt.total_points),
        );
        last_points = receipt.total_points;

        // duplicate finish must be a no-op
        check(
            "duplicate finish not absorbed",
            engine.finish_mission(&mut session) == FinishStatus::AlreadyReported,
        );
        check(
            "points changed on duplicate finish",
            engine.progress().current_points == last_points,
        );

        let unlocked = engine.unlocked_missions();
        check(
            "unlocked set shrank",
            last_unlocked.iter().all(|id| unlocked.contains(id)),
        );
        last_unlocked = unlocked;
    }

    let progress = engine.progress();
    Ok(RunRecord {
        seed,
        completed: progress.completed_missions.len(),
        final_points: progress.current_points,
        final_level: progress.level,
    })
}
