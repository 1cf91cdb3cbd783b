//! DPO Hero web adapter
//!
//! Browser-specific implementations of the dpo-hero-game traits: embedded
//! JSON assets for content and localStorage for persistence.

pub mod game;

pub use game::{
    WebContentLoader, WebDataError, WebProgressStorage, WebStorageError, create_web_engine,
    load_last_scene, save_last_scene,
};
