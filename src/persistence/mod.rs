//! Key/value persistence
//!
//! Everything the game keeps between visits goes through [`Storage`]:
//! - Best score (plain integer)
//! - Achievements, leaderboard and settings (JSON)
//! - One best-effort save slot (JSON)
//!
//! Failures are logged and swallowed; gameplay never depends on storage.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::sim::GameState;

pub const BEST_SCORE_KEY: &str = "2048-nexus-best-v2";
pub const ACHIEVEMENTS_KEY: &str = "2048-nexus-ach-v2";
pub const LEADERBOARD_KEY: &str = "2048-nexus-lb-v2";
pub const SETTINGS_KEY: &str = "2048-nexus-settings";
pub const SAVE_KEY: &str = "2048-nexus-save";

/// String key/value store (LocalStorage on the web)
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    /// Returns false if the value could not be stored
    fn set_item(&mut self, key: &str, value: &str) -> bool;
    fn remove_item(&mut self, key: &str);
}

/// In-memory storage for native builds and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> bool {
        self.items.insert(key.to_string(), value.to_string());
        true
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// Browser LocalStorage. Missing storage (private mode, sandboxed iframe)
/// behaves as an always-empty store.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> Self {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if inner.is_none() {
            log::warn!("LocalStorage unavailable - progress will not be saved");
        }
        Self { inner }
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok()?
    }

    fn set_item(&mut self, key: &str, value: &str) -> bool {
        match &self.inner {
            Some(storage) => storage.set_item(key, value).is_ok(),
            None => false,
        }
    }

    fn remove_item(&mut self, key: &str) {
        if let Some(storage) = &self.inner {
            let _ = storage.remove_item(key);
        }
    }
}

/// Read and parse a JSON value. Missing or corrupt entries yield `None`.
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let json = storage.get_item(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring corrupt {}: {}", key, e);
            None
        }
    }
}

/// Serialize and store a JSON value
pub fn save_json<T: Serialize>(storage: &mut dyn Storage, key: &str, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Could not serialize {}: {}", key, e);
            return false;
        }
    };
    let stored = storage.set_item(key, &json);
    if !stored {
        log::warn!("Could not store {}", key);
    }
    stored
}

pub fn load_best_score(storage: &dyn Storage) -> u64 {
    storage
        .get_item(BEST_SCORE_KEY)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

pub fn save_best_score(storage: &mut dyn Storage, best: u64) -> bool {
    storage.set_item(BEST_SCORE_KEY, &best.to_string())
}

/// Write the save slot, replacing any previous save
pub fn save_game(storage: &mut dyn Storage, state: &GameState) -> bool {
    let saved = save_json(storage, SAVE_KEY, state);
    if saved {
        log::info!("Game saved ({} moves, score {})", state.score.moves, state.score.score);
    }
    saved
}

/// Load the save slot. The spawn RNG is reseeded with `seed`.
pub fn load_game(storage: &dyn Storage, seed: u64) -> Option<GameState> {
    let mut state: GameState = load_json(storage, SAVE_KEY)?;
    state.reseed(seed);
    Some(state)
}

pub fn clear_saved_game(storage: &mut dyn Storage) {
    storage.remove_item(SAVE_KEY);
    log::info!("Saved game cleared");
}
