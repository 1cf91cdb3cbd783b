//! Web-specific engine wiring
//!
//! This module provides web-specific implementations of the dpo-hero-game
//! traits and re-exports the core logic types.

use gloo::storage::errors::StorageError;
use gloo::storage::{LocalStorage, Storage};

// Re-export all types from dpo-hero-game
pub use dpo_hero_game::*;

/// Content loader backed by assets embedded at build time.
pub struct WebContentLoader;

#[derive(Debug, thiserror::Error)]
pub enum WebDataError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl ContentLoader for WebContentLoader {
    type Error = WebDataError;

    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error> {
        let json = include_str!("../../assets/data/missions.json");
        MissionCatalog::from_json(json).map_err(WebDataError::Catalog)
    }

    fn load_content(&self) -> Result<ContentData, Self::Error> {
        let json = include_str!("../../assets/data/content.json");
        ContentData::from_json(json).map_err(WebDataError::Json)
    }
}

/// localStorage-backed persistence using the published key layout.
pub struct WebProgressStorage;

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("storage error: {0}")]
    Storage(String),
}

fn storage_err(err: &StorageError) -> WebStorageError {
    WebStorageError::Storage(format!("{err:?}"))
}

impl ProgressStorage for WebProgressStorage {
    type Error = WebStorageError;

    fn load_progress(&self) -> Result<Option<PlayerProgress>, Self::Error> {
        match LocalStorage::get(PROGRESS_STORAGE_KEY) {
            Ok(progress) => Ok(Some(progress)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(storage_err(&err)),
        }
    }

    fn save_progress(&self, progress: &PlayerProgress) -> Result<(), Self::Error> {
        LocalStorage::set(PROGRESS_STORAGE_KEY, progress).map_err(|err| storage_err(&err))
    }

    fn load_session(&self) -> Result<Option<SessionSnapshot>, Self::Error> {
        match LocalStorage::get(SESSION_STORAGE_KEY) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(storage_err(&err)),
        }
    }

    fn save_session(&self, snapshot: &SessionSnapshot) -> Result<(), Self::Error> {
        LocalStorage::set(SESSION_STORAGE_KEY, snapshot).map_err(|err| storage_err(&err))
    }

    fn clear_session(&self) -> Result<(), Self::Error> {
        LocalStorage::delete(SESSION_STORAGE_KEY);
        Ok(())
    }
}

/// Remember the last visited scene for navigation convenience.
///
/// Best effort; a failed write is logged and the game carries on.
pub fn save_last_scene(scene: &str) {
    if let Err(err) = LocalStorage::set(LAST_SCENE_STORAGE_KEY, scene) {
        log::warn!("failed to remember last scene: {err:?}");
    }
}

/// The last visited scene, if one was recorded.
#[must_use]
pub fn load_last_scene() -> Option<String> {
    LocalStorage::get(LAST_SCENE_STORAGE_KEY).ok()
}

/// Open a browser engine over embedded assets and localStorage.
///
/// # Errors
///
/// Returns an error when the embedded assets fail to parse or validate.
pub fn create_web_engine() -> Result<MissionEngine<WebProgressStorage>, WebDataError> {
    MissionEngine::open(&WebContentLoader, WebProgressStorage)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Asset checks run on any target; the localStorage paths are exercised
    // in the browser.

    #[test]
    fn embedded_catalog_parses_and_validates() {
        let catalog = WebContentLoader.load_catalog().expect("catalog is valid");
        assert!(catalog.find("training").is_some());
        assert!(catalog.find("final_assessment").is_some());
    }

    #[test]
    fn embedded_content_covers_every_catalog_mission() {
        let catalog = WebContentLoader.load_catalog().unwrap();
        let content = WebContentLoader.load_content().unwrap();
        for mission in &catalog.missions {
            let items = content
                .find(&mission.id)
                .unwrap_or_else(|| panic!("missing content for '{}'", mission.id));
            assert!(
                !items.items.is_empty(),
                "mission '{}' has no items",
                mission.id
            );
        }
    }

    #[test]
    fn every_prerequisite_references_a_real_mission() {
        let catalog = WebContentLoader.load_catalog().unwrap();
        for mission in &catalog.missions {
            for req in &mission.required_missions {
                assert!(
                    catalog.find(req).is_some(),
                    "mission '{}' requires unknown '{req}'",
                    mission.id
                );
            }
        }
    }

    #[test]
    fn session_point_missions_pay_their_headline_reward_on_a_perfect_run() {
        let catalog = WebContentLoader.load_catalog().unwrap();
        let content = WebContentLoader.load_content().unwrap();
        for mission in &catalog.missions {
            if mission.reward == RewardRule::SessionPoints && mission.points > 0 {
                let max = content.find(&mission.id).unwrap().max_points();
                assert_eq!(
                    max, mission.points,
                    "mission '{}' items sum to {max}, expected {}",
                    mission.id, mission.points
                );
            }
        }
    }

    #[test]
    fn scaled_missions_item_points_sum_to_the_headline_reward() {
        let catalog = WebContentLoader.load_catalog().unwrap();
        let content = WebContentLoader.load_content().unwrap();
        let patrol = catalog.find("city_patrol").unwrap();
        assert_eq!(patrol.reward, RewardRule::ScaledByScore);
        assert_eq!(content.find("city_patrol").unwrap().max_points(), patrol.points);
    }
}
