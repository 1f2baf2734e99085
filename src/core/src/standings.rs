use crate::game::{GameOutcome, GameWinner};
use crate::schedule::CompiledSchedule;
use crate::team::{Conference, TeamIndex};
use serde::Serialize;

/// Win percentage of a record, with ties worth half a win. A team that
/// has not played counts as .500.
pub fn record_percentage(wins: u16, losses: u16, ties: u16) -> f64 {
    let games = wins + losses + ties;
    if games == 0 {
        return 0.5;
    }
    (f64::from(wins) + 0.5 * f64::from(ties)) / f64::from(games)
}

/// One team's record, derived from a full or partial set of game
/// outcomes. Never stored; always recomputed from outcomes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Standing {
    pub wins: u16,
    pub losses: u16,
    pub ties: u16,
    pub division_wins: u16,
    pub division_losses: u16,
    pub division_ties: u16,
    pub conference_wins: u16,
    pub conference_losses: u16,
    pub conference_ties: u16,
    pub points_for: i64,
    pub points_against: i64,
}

impl Standing {
    pub fn games_played(&self) -> u16 {
        self.wins + self.losses + self.ties
    }

    pub fn win_percentage(&self) -> f64 {
        record_percentage(self.wins, self.losses, self.ties)
    }

    pub fn division_win_percentage(&self) -> f64 {
        record_percentage(self.division_wins, self.division_losses, self.division_ties)
    }

    pub fn conference_win_percentage(&self) -> f64 {
        record_percentage(
            self.conference_wins,
            self.conference_losses,
            self.conference_ties,
        )
    }

    pub fn net_points(&self) -> i64 {
        self.points_for - self.points_against
    }
}

/// Folds one season's outcomes into standings plus every derived
/// metric the tiebreaker rules consume: the head-to-head matrix,
/// strength of victory / schedule, and combined points-scored +
/// points-allowed rankings (conference and league scope).
///
/// Owns its buffers so the trial loop can reuse one instance per
/// worker; `calculate` fully resets state each call.
#[derive(Debug)]
pub struct StandingsCalculator {
    team_count: usize,
    standings: Vec<Standing>,
    h2h_wins: Vec<u8>,
    h2h_ties: Vec<u8>,
    win_pct: Vec<f64>,
    strength_of_victory: Vec<f64>,
    strength_of_schedule: Vec<f64>,
    combined_conference_rank: Vec<f64>,
    combined_league_rank: Vec<f64>,
}

impl StandingsCalculator {
    pub fn new(team_count: usize) -> Self {
        StandingsCalculator {
            team_count,
            standings: vec![Standing::default(); team_count],
            h2h_wins: vec![0; team_count * team_count],
            h2h_ties: vec![0; team_count * team_count],
            win_pct: vec![0.0; team_count],
            strength_of_victory: vec![0.0; team_count],
            strength_of_schedule: vec![0.0; team_count],
            combined_conference_rank: vec![0.0; team_count],
            combined_league_rank: vec![0.0; team_count],
        }
    }

    pub fn calculate(
        &mut self,
        schedule: &CompiledSchedule,
        teams: &TeamIndex,
        scores: &[Option<GameOutcome>],
    ) {
        self.reset();
        self.fold_outcomes(schedule, scores);

        for team in 0..self.team_count {
            self.win_pct[team] = self.standings[team].win_percentage();
        }

        self.fold_strength_metrics(schedule, scores);
        self.fold_points_rankings(teams);
    }

    pub fn standing(&self, team: usize) -> &Standing {
        &self.standings[team]
    }

    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }

    pub fn win_percentage(&self, team: usize) -> f64 {
        self.win_pct[team]
    }

    /// Record of `team` against `opponent`: (wins, losses, ties).
    pub fn head_to_head(&self, team: usize, opponent: usize) -> (u16, u16, u16) {
        (
            u16::from(self.h2h_wins[team * self.team_count + opponent]),
            u16::from(self.h2h_wins[opponent * self.team_count + team]),
            u16::from(self.h2h_ties[team * self.team_count + opponent]),
        )
    }

    pub fn strength_of_victory(&self, team: usize) -> f64 {
        self.strength_of_victory[team]
    }

    pub fn strength_of_schedule(&self, team: usize) -> f64 {
        self.strength_of_schedule[team]
    }

    /// Points-scored rank plus points-allowed rank among conference
    /// teams; lower is better. Rank ties share the average of their
    /// ordinal positions.
    pub fn combined_conference_rank(&self, team: usize) -> f64 {
        self.combined_conference_rank[team]
    }

    pub fn combined_league_rank(&self, team: usize) -> f64 {
        self.combined_league_rank[team]
    }

    fn reset(&mut self) {
        self.standings.iter_mut().for_each(|s| *s = Standing::default());
        self.h2h_wins.iter_mut().for_each(|v| *v = 0);
        self.h2h_ties.iter_mut().for_each(|v| *v = 0);
    }

    fn fold_outcomes(&mut self, schedule: &CompiledSchedule, scores: &[Option<GameOutcome>]) {
        for (game, outcome) in schedule.games().iter().zip(scores) {
            let Some(outcome) = outcome else { continue };

            let (home, away) = (game.home, game.away);

            match outcome.winner() {
                GameWinner::Home => {
                    self.standings[home].wins += 1;
                    self.standings[away].losses += 1;
                    if game.division_game {
                        self.standings[home].division_wins += 1;
                        self.standings[away].division_losses += 1;
                    }
                    if game.conference_game {
                        self.standings[home].conference_wins += 1;
                        self.standings[away].conference_losses += 1;
                    }
                    self.h2h_wins[home * self.team_count + away] += 1;
                }
                GameWinner::Away => {
                    self.standings[away].wins += 1;
                    self.standings[home].losses += 1;
                    if game.division_game {
                        self.standings[away].division_wins += 1;
                        self.standings[home].division_losses += 1;
                    }
                    if game.conference_game {
                        self.standings[away].conference_wins += 1;
                        self.standings[home].conference_losses += 1;
                    }
                    self.h2h_wins[away * self.team_count + home] += 1;
                }
                GameWinner::Tie => {
                    self.standings[home].ties += 1;
                    self.standings[away].ties += 1;
                    if game.division_game {
                        self.standings[home].division_ties += 1;
                        self.standings[away].division_ties += 1;
                    }
                    if game.conference_game {
                        self.standings[home].conference_ties += 1;
                        self.standings[away].conference_ties += 1;
                    }
                    self.h2h_ties[home * self.team_count + away] += 1;
                    self.h2h_ties[away * self.team_count + home] += 1;
                }
            }

            self.standings[home].points_for += i64::from(outcome.home_score);
            self.standings[home].points_against += i64::from(outcome.away_score);
            self.standings[away].points_for += i64::from(outcome.away_score);
            self.standings[away].points_against += i64::from(outcome.home_score);
        }
    }

    fn fold_strength_metrics(&mut self, schedule: &CompiledSchedule, scores: &[Option<GameOutcome>]) {
        let mut victory_sum = vec![0.0f64; self.team_count];
        let mut victory_count = vec![0u16; self.team_count];
        let mut schedule_sum = vec![0.0f64; self.team_count];
        let mut schedule_count = vec![0u16; self.team_count];

        for (game, outcome) in schedule.games().iter().zip(scores) {
            let Some(outcome) = outcome else { continue };

            let (home, away) = (game.home, game.away);

            schedule_sum[home] += self.win_pct[away];
            schedule_count[home] += 1;
            schedule_sum[away] += self.win_pct[home];
            schedule_count[away] += 1;

            match outcome.winner() {
                GameWinner::Home => {
                    victory_sum[home] += self.win_pct[away];
                    victory_count[home] += 1;
                }
                GameWinner::Away => {
                    victory_sum[away] += self.win_pct[home];
                    victory_count[away] += 1;
                }
                GameWinner::Tie => {}
            }
        }

        for team in 0..self.team_count {
            self.strength_of_victory[team] = if victory_count[team] > 0 {
                victory_sum[team] / f64::from(victory_count[team])
            } else {
                0.0
            };
            self.strength_of_schedule[team] = if schedule_count[team] > 0 {
                schedule_sum[team] / f64::from(schedule_count[team])
            } else {
                0.0
            };
        }
    }

    fn fold_points_rankings(&mut self, teams: &TeamIndex) {
        let league: Vec<usize> = (0..self.team_count).collect();
        self.write_combined_ranks(&league, false);

        for conference in Conference::ALL {
            let members = teams.conference_members(conference);
            if !members.is_empty() {
                self.write_combined_ranks(&members, true);
            }
        }
    }

    fn write_combined_ranks(&mut self, members: &[usize], conference_scope: bool) {
        let scored: Vec<i64> = members.iter().map(|&t| self.standings[t].points_for).collect();
        let allowed: Vec<i64> = members
            .iter()
            .map(|&t| self.standings[t].points_against)
            .collect();

        // Most points scored ranks first, fewest points allowed ranks first.
        let scored_ranks = average_ranks(&scored, true);
        let allowed_ranks = average_ranks(&allowed, false);

        for (pos, &team) in members.iter().enumerate() {
            let combined = scored_ranks[pos] + allowed_ranks[pos];
            if conference_scope {
                self.combined_conference_rank[team] = combined;
            } else {
                self.combined_league_rank[team] = combined;
            }
        }
    }
}

/// 1-based ranks for `values`, best first. Equal values share the
/// average of the ordinal positions they span.
fn average_ranks(values: &[i64], descending: bool) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    if descending {
        order.sort_by(|&a, &b| values[b].cmp(&values[a]).then(a.cmp(&b)));
    } else {
        order.sort_by(|&a, &b| values[a].cmp(&values[b]).then(a.cmp(&b)));
    }

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end are 1-based ordinals start+1 ..= end.
        let shared = (start + 1 + end) as f64 / 2.0;
        for &member in &order[start..end] {
            ranks[member] = shared;
        }
        start = end;
    }

    ranks
}
