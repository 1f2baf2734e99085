use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameWinner {
    Home,
    Away,
    Tie,
}

/// A scheduled game. Scores live in three layers: the actual result
/// (when `is_completed`), a user override (when `is_overridden`), and
/// nothing at all for games still to be simulated. The override always
/// wins when present; the actual result is kept alongside it so a
/// schedule refresh never silently discards the user's choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub week: u8,
    pub home_team_id: String,
    pub away_team_id: String,
    #[serde(default)]
    pub home_score: Option<u16>,
    #[serde(default)]
    pub away_score: Option<u16>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_overridden: bool,
    #[serde(default)]
    pub override_home_score: Option<u16>,
    #[serde(default)]
    pub override_away_score: Option<u16>,
}

impl Game {
    /// Effective (home, away) scores: override first, then the actual
    /// result, `None` for a game the simulator has to decide.
    pub fn effective_scores(&self) -> Option<(u16, u16)> {
        if self.is_overridden {
            match (self.override_home_score, self.override_away_score) {
                (Some(home), Some(away)) => Some((home, away)),
                _ => None,
            }
        } else if self.is_completed {
            match (self.home_score, self.away_score) {
                (Some(home), Some(away)) => Some((home, away)),
                _ => None,
            }
        } else {
            None
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.effective_scores().is_some()
    }

    pub fn winner(&self) -> Option<GameWinner> {
        self.effective_scores().map(|(home, away)| {
            if home > away {
                GameWinner::Home
            } else if away > home {
                GameWinner::Away
            } else {
                GameWinner::Tie
            }
        })
    }
}

/// The resolved outcome of one game inside one trial. The game itself
/// is implied by position in the compiled schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub home_score: u16,
    pub away_score: u16,
}

impl GameOutcome {
    pub fn winner(&self) -> GameWinner {
        if self.home_score > self.away_score {
            GameWinner::Home
        } else if self.away_score > self.home_score {
            GameWinner::Away
        } else {
            GameWinner::Tie
        }
    }
}
