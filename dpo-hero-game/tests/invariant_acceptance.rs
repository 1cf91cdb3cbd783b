//! Seeded acceptance sweeps over the progression invariants:
//! monotonic points, no double reward, derived levels, unlock monotonicity,
//! single reporting, and score bounds.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use dpo_hero_game::{
    MissionCatalog, MissionContent, MissionDefinition, MissionSession, PlayerProgress,
    ProgressStorage, ProgressStore, Response, RewardRule, SessionItem, SessionSnapshot,
    level_for_points,
};

const SWEEP_SEEDS: [u64; 4] = [1337, 0xDEAD_BEEF, 42, 20_260_806];

#[derive(Clone, Default)]
struct MemoryStorage {
    progress: Rc<RefCell<Option<PlayerProgress>>>,
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
        Ok(None)
    }

    fn save_session(&self, _snapshot: &SessionSnapshot) -> Result<(), Self::Error> {
        Ok(())
    }

    fn clear_session(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn sweep_catalog() -> MissionCatalog {
    let mission = |id: &str, points: u32, required: &[&str]| MissionDefinition {
        id: id.to_string(),
        name: id.to_string(),
        desc: String::new(),
        points,
        required_missions: required.iter().map(ToString::to_string).collect(),
        reward: RewardRule::SessionPoints,
    };
    MissionCatalog::from_missions(vec![
        mission("m0", 30, &[]),
        mission("m1", 45, &[]),
        mission("m2", 60, &["m0"]),
        mission("m3", 80, &["m0", "m1"]),
        mission("m4", 120, &["m2", "m3"]),
    ])
    .unwrap()
}

#[test]
fn random_completion_sequences_keep_points_levels_and_unlocks_consistent() {
    let catalog = sweep_catalog();
    let ids = ["m0", "m1", "m2", "m3", "m4"];

    for seed in SWEEP_SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let (mut store, _) = ProgressStore::open(MemoryStorage::default());
        let mut last_points = 0_u32;
        let mut last_unlocked = store.unlocked_missions(&catalog);

        for _ in 0..200 {
            // duplicates on purpose: replays must be no-ops
            let id = ids[rng.gen_range(0..ids.len())];
            let was_completed = store.progress().is_completed(id);
            let points = rng.gen_range(0..=150);
            let receipt = store.complete_mission(id, points);

            // a repeat never mutates
            assert_eq!(receipt.first_time, !was_completed, "seed {seed}");
            if was_completed {
                assert_eq!(receipt.total_points, last_points, "seed {seed}");
            }

            // points never decrease
            assert!(receipt.total_points >= last_points, "seed {seed}");
            last_points = receipt.total_points;

            // the level never drifts from the formula
            assert_eq!(
                receipt.level,
                level_for_points(receipt.total_points),
                "seed {seed}"
            );
            assert_eq!(store.progress().level, receipt.level, "seed {seed}");

            // the unlocked set only grows
            let unlocked = store.unlocked_missions(&catalog);
            for id in &last_unlocked {
                assert!(unlocked.contains(id), "seed {seed}: '{id}' re-locked");
            }
            last_unlocked = unlocked;
        }
    }
}

#[test]
fn random_answer_sequences_keep_the_score_in_bounds() {
    for seed in SWEEP_SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        for _ in 0..50 {
            let item_count = rng.gen_range(0..8);
            let items = (0..item_count)
                .map(|i| SessionItem::Question {
                    prompt: format!("q{i}"),
                    options: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                    answer: rng.gen_range(0..3),
                    points: rng.gen_range(0..40),
                })
                .collect();
            let content = MissionContent {
                mission_id: "sweep".to_string(),
                items,
            };
            let mut session = MissionSession::new(&content);

            // the score is in bounds before any answer
            assert!((0.0..=100.0).contains(&session.score_percent()), "seed {seed}");

            // over-answer on purpose: the tail calls must be no-ops
            let answers = rng.gen_range(0..12);
            for _ in 0..answers {
                session.answer(&Response::Choice(rng.gen_range(0..4)));
                let pct = session.score_percent();
                assert!((0.0..=100.0).contains(&pct), "seed {seed}: pct {pct}");
            }
            assert!(session.current_index() <= content.items.len(), "seed {seed}");

            // the outcome is emitted exactly once
            let first = session.complete();
            assert!(first.is_some(), "seed {seed}");
            assert!(session.complete().is_none(), "seed {seed}");
            let outcome = first.unwrap();
            assert!(
                (0.0..=100.0).contains(&outcome.score_percent),
                "seed {seed}"
            );
            assert!(
                outcome.accumulated_points <= content.max_points(),
                "seed {seed}"
            );
        }
    }
}

#[test]
fn persisted_state_always_matches_memory_after_each_mutation() {
    let catalog = sweep_catalog();
    let storage = MemoryStorage::default();
    let (mut store, _) = ProgressStore::open(storage.clone());

    for (i, id) in ["m0", "m1", "m2", "m3", "m4"].iter().enumerate() {
        let receipt = store.complete_mission(id, 50 + i as u32 * 10);
        assert!(receipt.persisted);
        let saved = storage.progress.borrow().clone().unwrap();
        assert_eq!(&saved, store.progress());
    }
    assert_eq!(store.unlocked_missions(&catalog).len(), 5);
}
