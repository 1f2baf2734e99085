use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// League size is fixed: 32 teams in 8 divisions of 4.
pub const TEAM_COUNT: usize = 32;

/// Regular season length per team.
pub const GAMES_PER_TEAM: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Conference {
    #[serde(rename = "AFC")]
    Afc,
    #[serde(rename = "NFC")]
    Nfc,
}

impl Conference {
    pub const ALL: [Conference; 2] = [Conference::Afc, Conference::Nfc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Conference::Afc => "AFC",
            Conference::Nfc => "NFC",
        }
    }
}

impl fmt::Display for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    East,
    North,
    South,
    West,
}

impl Division {
    pub const ALL: [Division; 4] = [
        Division::East,
        Division::North,
        Division::South,
        Division::West,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Division::East => "East",
            Division::North => "North",
            Division::South => "South",
            Division::West => "West",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static team metadata. Identifiers are stable lowercase strings
/// (e.g. `kc`); everything that runs per trial refers to teams through
/// the dense index instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub abbreviation: String,
    pub name: String,
    pub display_name: String,
    pub conference: Conference,
    pub division: Division,
}

impl Team {
    pub fn full_division(&self) -> String {
        format!("{} {}", self.conference, self.division)
    }
}

/// Immutable roster with a dense index (0..team_count) used by all hot
/// paths. Built once per process / per job snapshot.
#[derive(Debug, Clone)]
pub struct TeamIndex {
    teams: Vec<Team>,
    by_id: HashMap<String, usize>,
}

impl TeamIndex {
    pub fn new(teams: Vec<Team>) -> Self {
        let by_id = teams
            .iter()
            .enumerate()
            .map(|(idx, team)| (team.id.clone(), idx))
            .collect();

        TeamIndex { teams, by_id }
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn get(&self, index: usize) -> &Team {
        &self.teams[index]
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn conference(&self, index: usize) -> Conference {
        self.teams[index].conference
    }

    pub fn division(&self, index: usize) -> Division {
        self.teams[index].division
    }

    pub fn same_conference(&self, a: usize, b: usize) -> bool {
        self.teams[a].conference == self.teams[b].conference
    }

    pub fn same_division(&self, a: usize, b: usize) -> bool {
        self.same_conference(a, b) && self.teams[a].division == self.teams[b].division
    }

    pub fn conference_members(&self, conference: Conference) -> Vec<usize> {
        (0..self.teams.len())
            .filter(|&idx| self.teams[idx].conference == conference)
            .collect()
    }

    pub fn division_members(&self, conference: Conference, division: Division) -> Vec<usize> {
        (0..self.teams.len())
            .filter(|&idx| {
                self.teams[idx].conference == conference && self.teams[idx].division == division
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::league_32;

    #[test]
    fn dense_index_round_trips_ids() {
        let teams = league_32();

        assert_eq!(teams.len(), TEAM_COUNT);

        for idx in 0..teams.len() {
            let id = teams.get(idx).id.clone();
            assert_eq!(teams.position(&id), Some(idx));
        }

        assert_eq!(teams.position("not-a-team"), None);
    }

    #[test]
    fn divisions_partition_the_league() {
        let teams = league_32();

        for conference in Conference::ALL {
            let conf_members = teams.conference_members(conference);
            assert_eq!(conf_members.len(), 16);

            for division in Division::ALL {
                assert_eq!(teams.division_members(conference, division).len(), 4);
            }
        }
    }

    #[test]
    fn conference_serializes_to_upstream_names() {
        assert_eq!(
            serde_json::to_string(&Conference::Afc).unwrap(),
            "\"AFC\""
        );
        assert_eq!(
            serde_json::to_string(&Division::North).unwrap(),
            "\"North\""
        );
    }
}
