use crate::{CacheStore, StorageError};
use chrono::{DateTime, Utc};
use gridiron_core::Game;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

pub const OVERRIDES_FILE: &str = "user_overrides.json";

/// One user-supplied outcome, keyed by game id in the persisted map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub home_score: u16,
    pub away_score: u16,
    pub set_at: DateTime<Utc>,
}

/// User overrides, held in memory behind a readers-writer lock and
/// mirrored to `user_overrides.json` on every change. Reads (applying
/// to a schedule snapshot) vastly outnumber writes.
#[derive(Debug)]
pub struct OverrideStore {
    store: CacheStore,
    entries: RwLock<HashMap<String, OverrideEntry>>,
}

impl OverrideStore {
    pub fn load(store: CacheStore) -> Result<Self, StorageError> {
        let entries: HashMap<String, OverrideEntry> =
            store.read_json(OVERRIDES_FILE)?.unwrap_or_default();

        if !entries.is_empty() {
            info!("loaded {} game overrides", entries.len());
        }

        Ok(OverrideStore {
            store,
            entries: RwLock::new(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, game_id: &str) -> Option<OverrideEntry> {
        self.read_entries().get(game_id).cloned()
    }

    /// Inserts or replaces the override for a game and persists the
    /// full map atomically.
    pub fn set(&self, game_id: &str, home_score: u16, away_score: u16) -> Result<(), StorageError> {
        let mut entries = self.write_entries();
        entries.insert(
            game_id.to_string(),
            OverrideEntry {
                home_score,
                away_score,
                set_at: Utc::now(),
            },
        );
        self.store.write_json_atomic(OVERRIDES_FILE, &*entries)
    }

    /// Removes an override; returns whether one existed.
    pub fn clear(&self, game_id: &str) -> Result<bool, StorageError> {
        let mut entries = self.write_entries();
        let removed = entries.remove(game_id).is_some();
        if removed {
            self.store.write_json_atomic(OVERRIDES_FILE, &*entries)?;
        }
        Ok(removed)
    }

    /// Stamps override fields onto matching games. Actual results are
    /// left in place: when an upstream refresh fills in a score for an
    /// overridden game, both stay visible and the user resolves the
    /// conflict.
    pub fn apply(&self, games: &mut [Game]) {
        let entries = self.read_entries();
        if entries.is_empty() {
            return;
        }

        for game in games.iter_mut() {
            if let Some(entry) = entries.get(&game.id) {
                game.is_overridden = true;
                game.override_home_score = Some(entry.home_score);
                game.override_away_score = Some(entry.away_score);
            }
        }
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, OverrideEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, OverrideEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
