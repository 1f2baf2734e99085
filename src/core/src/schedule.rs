use crate::game::{Game, GameOutcome};
use crate::team::TeamIndex;
use log::warn;

/// One schedule entry with team references resolved to dense indices.
#[derive(Debug, Clone)]
pub struct CompiledGame {
    pub home: usize,
    pub away: usize,
    /// Effective outcome for completed or overridden games; `None`
    /// marks a game the simulator decides per trial.
    pub fixed: Option<GameOutcome>,
    pub division_game: bool,
    pub conference_game: bool,
}

/// Schedule preprocessed for the trial loop. Everything in here is
/// derived from team metadata and the immutable schedule alone, so it
/// is computed once and shared by every trial: per-team game lists,
/// per-team opponent bitmasks (opponent sets never change across
/// trials), and the list of games left to simulate.
#[derive(Debug, Clone)]
pub struct CompiledSchedule {
    games: Vec<CompiledGame>,
    team_games: Vec<Vec<u32>>,
    opponent_masks: Vec<u32>,
    unresolved: Vec<u32>,
}

impl CompiledSchedule {
    pub fn compile(games: &[Game], teams: &TeamIndex) -> Self {
        let mut compiled = Vec::with_capacity(games.len());
        let mut team_games = vec![Vec::new(); teams.len()];
        let mut opponent_masks = vec![0u32; teams.len()];
        let mut unresolved = Vec::new();

        for game in games {
            let (home, away) = match (
                teams.position(&game.home_team_id),
                teams.position(&game.away_team_id),
            ) {
                (Some(home), Some(away)) => (home, away),
                _ => {
                    warn!(
                        "game {}: unknown team (home: {}, away: {})",
                        game.id, game.home_team_id, game.away_team_id
                    );
                    continue;
                }
            };

            if home == away {
                warn!("game {}: team {} plays itself, skipped", game.id, game.home_team_id);
                continue;
            }

            let index = compiled.len() as u32;
            let fixed = game
                .effective_scores()
                .map(|(home_score, away_score)| GameOutcome { home_score, away_score });

            if fixed.is_none() {
                unresolved.push(index);
            }

            team_games[home].push(index);
            team_games[away].push(index);
            opponent_masks[home] |= 1 << away;
            opponent_masks[away] |= 1 << home;

            compiled.push(CompiledGame {
                home,
                away,
                fixed,
                division_game: teams.same_division(home, away),
                conference_game: teams.same_conference(home, away),
            });
        }

        CompiledSchedule {
            games: compiled,
            team_games,
            opponent_masks,
            unresolved,
        }
    }

    pub fn games(&self) -> &[CompiledGame] {
        &self.games
    }

    pub fn team_games(&self, team: usize) -> &[u32] {
        &self.team_games[team]
    }

    pub fn opponent_mask(&self, team: usize) -> u32 {
        self.opponent_masks[team]
    }

    pub fn unresolved(&self) -> &[u32] {
        &self.unresolved
    }

    /// Per-game outcome template for one trial: fixed games filled in,
    /// unresolved games `None`. Workers clone this once and rewrite the
    /// unresolved slots every trial.
    pub fn baseline(&self) -> Vec<Option<GameOutcome>> {
        self.games.iter().map(|game| game.fixed).collect()
    }

    /// Opponents shared by every team in `set`, as a bitmask. Members
    /// of the set exclude themselves automatically (no team is its own
    /// opponent).
    pub fn common_opponents(&self, set: &[usize]) -> u32 {
        set.iter()
            .fold(u32::MAX, |mask, &team| mask & self.opponent_masks[team])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{completed_game, game, league_32, round_robin_games};

    #[test]
    fn compile_resolves_teams_and_flags() {
        let teams = league_32();
        let games = vec![
            completed_game("g1", 1, "kc", "lv", 27, 20),
            game("g2", 1, "kc", "ne"),
            game("g3", 1, "kc", "dal"),
        ];

        let schedule = CompiledSchedule::compile(&games, &teams);

        assert_eq!(schedule.games().len(), 3);
        assert_eq!(schedule.unresolved(), &[1, 2]);

        let kc = teams.position("kc").unwrap();
        assert_eq!(schedule.team_games(kc).len(), 3);

        // kc vs lv is AFC West, kc vs ne is AFC inter-division,
        // kc vs dal crosses conferences.
        assert!(schedule.games()[0].division_game);
        assert!(!schedule.games()[1].division_game);
        assert!(schedule.games()[1].conference_game);
        assert!(!schedule.games()[2].conference_game);
    }

    #[test]
    fn unknown_teams_are_skipped() {
        let teams = league_32();
        let games = vec![game("g1", 1, "kc", "nowhere")];

        let schedule = CompiledSchedule::compile(&games, &teams);

        assert!(schedule.games().is_empty());
    }

    #[test]
    fn full_season_gives_every_team_seventeen_games() {
        let teams = league_32();
        let games = round_robin_games(&teams);
        let schedule = CompiledSchedule::compile(&games, &teams);

        assert_eq!(schedule.games().len(), 272);
        for team in 0..teams.len() {
            assert_eq!(schedule.team_games(team).len(), 17);
            assert_eq!(schedule.opponent_mask(team).count_ones(), 17);
        }
    }

    #[test]
    fn common_opponents_exclude_the_tied_teams() {
        let teams = league_32();
        // a and b both played c; a also played b.
        let games = vec![
            game("g1", 1, "kc", "den"),
            game("g2", 2, "kc", "lv"),
            game("g3", 2, "den", "lv"),
        ];
        let schedule = CompiledSchedule::compile(&games, &teams);

        let kc = teams.position("kc").unwrap();
        let den = teams.position("den").unwrap();
        let lv = teams.position("lv").unwrap();

        let mask = schedule.common_opponents(&[kc, den]);
        assert_eq!(mask & (1 << lv), 1 << lv);
        assert_eq!(mask & (1 << kc), 0);
        assert_eq!(mask & (1 << den), 0);
    }
}
