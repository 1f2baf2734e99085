use crate::{CacheStore, StorageError};
use gridiron_core::Team;
use log::warn;

pub const TEAMS_FILE: &str = "teams.json";

/// League metadata is effectively static, so a copy ships with the
/// binary for the case where the cache has never been populated.
const BUILTIN_TEAMS_JSON: &str = include_str!("../data/teams.json");

pub fn load_teams(store: &CacheStore) -> Result<Vec<Team>, StorageError> {
    if let Some(teams) = store.read_json::<Vec<Team>>(TEAMS_FILE)? {
        return Ok(teams);
    }

    warn!("{} not found in cache, using built-in league", TEAMS_FILE);
    Ok(serde_json::from_str(BUILTIN_TEAMS_JSON).expect("built-in teams.json is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_core::{Conference, TeamIndex};

    #[test]
    fn builtin_league_has_32_teams_in_8_divisions() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        let teams = load_teams(&store).unwrap();
        assert_eq!(teams.len(), 32);

        let index = TeamIndex::new(teams);
        for conference in Conference::ALL {
            assert_eq!(index.conference_members(conference).len(), 16);
        }
        assert!(index.position("kc").is_some());
    }

    #[test]
    fn cached_file_wins_over_the_builtin_league() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        let two_teams = serde_json::json!([
            { "id": "kc", "abbreviation": "KC", "name": "Kansas City Chiefs",
              "display_name": "Chiefs", "conference": "AFC", "division": "West" },
            { "id": "buf", "abbreviation": "BUF", "name": "Buffalo Bills",
              "display_name": "Bills", "conference": "AFC", "division": "East" }
        ]);
        store.write_json_atomic(TEAMS_FILE, &two_teams).unwrap();

        let teams = load_teams(&store).unwrap();
        assert_eq!(teams.len(), 2);
    }
}
