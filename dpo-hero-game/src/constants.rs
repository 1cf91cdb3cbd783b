//! Storage keys and pacing constants shared across crates.

/// localStorage key holding the persisted player progress blob.
pub const PROGRESS_STORAGE_KEY: &str = "dpoHeroProgress";

/// localStorage key holding the in-flight session scratch blob.
pub const SESSION_STORAGE_KEY: &str = "dpoHeroSession";

/// localStorage key remembering the last visited scene for navigation.
pub const LAST_SCENE_STORAGE_KEY: &str = "dpoHeroLastScene";

/// Additional points required per level step: reaching level `L + 1` costs
/// `LEVEL_COST_STEP * L` points on top of the previous threshold.
pub const LEVEL_COST_STEP: u32 = 100;
