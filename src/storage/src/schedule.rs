use crate::{CacheStore, StorageError};
use gridiron_core::Game;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;

pub const RESULTS_FILE: &str = "results_current.json";

const SCHEDULE_PREFIX: &str = "schedule_";
const SCHEDULE_SUFFIX: &str = ".json";

/// A completed game's final score, as published by the upstream
/// results snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: String,
    pub home_score: u16,
    pub away_score: u16,
}

/// Loads the newest `schedule_<season>.json` in the cache. An empty
/// schedule is returned when no snapshot exists; the server stays up
/// and an external collaborator fills the cache later.
pub fn load_schedule(store: &CacheStore) -> Result<Vec<Game>, StorageError> {
    let Some(season) = latest_season(store)? else {
        warn!("no schedule snapshot in {}", store.dir().display());
        return Ok(Vec::new());
    };

    let file_name = format!("{}{}{}", SCHEDULE_PREFIX, season, SCHEDULE_SUFFIX);
    let games: Vec<Game> = store.read_json(&file_name)?.unwrap_or_default();
    info!("loaded {} games from {}", games.len(), file_name);
    Ok(games)
}

pub fn load_results(store: &CacheStore) -> Result<Vec<GameResult>, StorageError> {
    Ok(store.read_json(RESULTS_FILE)?.unwrap_or_default())
}

/// Stamps final scores onto the schedule. Unknown game ids are logged
/// and skipped; the schedule snapshot is authoritative for what games
/// exist.
pub fn apply_results(games: &mut [Game], results: &[GameResult]) {
    for result in results {
        match games.iter_mut().find(|game| game.id == result.game_id) {
            Some(game) => {
                game.is_completed = true;
                game.home_score = Some(result.home_score);
                game.away_score = Some(result.away_score);
            }
            None => warn!("result for unknown game {}", result.game_id),
        }
    }
}

fn latest_season(store: &CacheStore) -> Result<Option<u32>, StorageError> {
    let entries = fs::read_dir(store.dir()).map_err(|source| StorageError::Io {
        path: store.dir().to_path_buf(),
        source,
    })?;

    let mut latest = None;
    for entry in entries {
        let entry = entry.map_err(|source| StorageError::Io {
            path: store.dir().to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(season) = name
            .strip_prefix(SCHEDULE_PREFIX)
            .and_then(|rest| rest.strip_suffix(SCHEDULE_SUFFIX))
            .and_then(|season| season.parse::<u32>().ok())
        else {
            continue;
        };

        latest = latest.max(Some(season));
    }

    Ok(latest)
}
