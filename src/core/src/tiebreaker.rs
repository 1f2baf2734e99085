use crate::game::{GameOutcome, GameWinner};
use crate::schedule::CompiledSchedule;
use crate::standings::StandingsCalculator;
use crate::team::{Conference, Division, TeamIndex};
use rand::Rng;

/// Which procedure governs a tie. The rule list is the same for both;
/// wild-card ties use clean-sweep semantics for head-to-head and first
/// reduce the set to one team per division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieContext {
    Division,
    WildCard,
}

/// Common-games rules only apply once the tied teams have this many
/// games against shared opponents between them.
const MIN_COMMON_GAMES: usize = 4;

/// The ordered rule list. Net touchdowns is intentionally absent; the
/// coin toss takes its place as the final rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    HeadToHead,
    DivisionRecord,
    CommonGamesRecord,
    ConferenceRecord,
    StrengthOfVictory,
    StrengthOfSchedule,
    ConferencePointsRank,
    LeaguePointsRank,
    NetPointsCommon,
    NetPointsAll,
}

impl Rule {
    const SEQUENCE: [Rule; 10] = [
        Rule::HeadToHead,
        Rule::DivisionRecord,
        Rule::CommonGamesRecord,
        Rule::ConferenceRecord,
        Rule::StrengthOfVictory,
        Rule::StrengthOfSchedule,
        Rule::ConferencePointsRank,
        Rule::LeaguePointsRank,
        Rule::NetPointsCommon,
        Rule::NetPointsAll,
    ];
}

/// Breaks ties between 2..N teams over one trial's standings. Holds
/// only borrows; construct one per trial after the standings fold.
pub struct TieBreaker<'a> {
    schedule: &'a CompiledSchedule,
    teams: &'a TeamIndex,
    standings: &'a StandingsCalculator,
    scores: &'a [Option<GameOutcome>],
}

impl<'a> TieBreaker<'a> {
    pub fn new(
        schedule: &'a CompiledSchedule,
        teams: &'a TeamIndex,
        standings: &'a StandingsCalculator,
        scores: &'a [Option<GameOutcome>],
    ) -> Self {
        TieBreaker {
            schedule,
            teams,
            standings,
            scores,
        }
    }

    /// Full best-to-worst ordering of `set`. Teams tied on overall
    /// win% go through the rule list; after each pick the losers
    /// re-enter from rule 1.
    pub fn order<R: Rng>(&self, set: &[usize], context: TieContext, rng: &mut R) -> Vec<usize> {
        let mut remaining = set.to_vec();
        let mut ordered = Vec::with_capacity(set.len());

        while !remaining.is_empty() {
            let pick = self.best_of(&remaining, context, rng);
            ordered.push(pick);
            remaining.retain(|&team| team != pick);
        }

        ordered
    }

    /// The next-best team of `set`: best overall win%, tiebreakers for
    /// teams sharing it.
    pub fn best_of<R: Rng>(&self, set: &[usize], context: TieContext, rng: &mut R) -> usize {
        if set.len() == 1 {
            return set[0];
        }

        let best = set
            .iter()
            .map(|&team| self.standings.win_percentage(team))
            .fold(f64::NEG_INFINITY, f64::max);
        let tied: Vec<usize> = set
            .iter()
            .copied()
            .filter(|&team| self.standings.win_percentage(team) == best)
            .collect();

        if tied.len() == 1 {
            tied[0]
        } else {
            self.break_tie(&tied, context, rng)
        }
    }

    /// Winner among teams with identical overall records. Whenever a
    /// rule shrinks the set, the survivors restart at rule 1; if all
    /// ten rules fail to separate, the coin toss decides.
    pub fn break_tie<R: Rng>(&self, set: &[usize], context: TieContext, rng: &mut R) -> usize {
        let mut remaining = set.to_vec();

        loop {
            if remaining.len() == 1 {
                return remaining[0];
            }

            if context == TieContext::WildCard {
                let reduced = self.division_leaders(&remaining, rng);
                if reduced.len() < remaining.len() {
                    remaining = reduced;
                    continue;
                }
            }

            let survivors = Rule::SEQUENCE
                .iter()
                .find_map(|&rule| self.survivors(rule, &remaining, context));

            match survivors {
                Some(subset) => remaining = subset,
                None => return remaining[rng.gen_range(0..remaining.len())],
            }
        }
    }

    /// Wild-card pre-step: keep only the division-tiebreaker winner
    /// from each division represented in the set.
    fn division_leaders<R: Rng>(&self, set: &[usize], rng: &mut R) -> Vec<usize> {
        let mut leaders = Vec::with_capacity(set.len());
        let mut seen: Vec<(Conference, Division)> = Vec::new();

        for &team in set {
            let key = (self.teams.conference(team), self.teams.division(team));
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);

            let group: Vec<usize> = set
                .iter()
                .copied()
                .filter(|&other| {
                    self.teams.conference(other) == key.0 && self.teams.division(other) == key.1
                })
                .collect();

            if group.len() == 1 {
                leaders.push(group[0]);
            } else {
                leaders.push(self.break_tie(&group, TieContext::Division, rng));
            }
        }

        leaders
    }

    /// Applies one rule. `None` means the rule did not separate anyone
    /// (or was skipped); `Some` is the strict subset still alive.
    fn survivors(&self, rule: Rule, set: &[usize], context: TieContext) -> Option<Vec<usize>> {
        match rule {
            Rule::HeadToHead => match context {
                TieContext::Division => {
                    self.best_by(set, |team| self.head_to_head_percentage(team, set))
                }
                TieContext::WildCard => self.sweep_winner(set).map(|team| vec![team]),
            },
            Rule::DivisionRecord => {
                self.best_by(set, |team| self.standings.standing(team).division_win_percentage())
            }
            Rule::CommonGamesRecord => {
                let common = self.common_opponents_checked(set)?;
                self.best_by(set, |team| {
                    let (wins, losses, ties) = self.record_against(team, common);
                    percentage_or_zero(wins, losses, ties)
                })
            }
            Rule::ConferenceRecord => {
                self.best_by(set, |team| self.standings.standing(team).conference_win_percentage())
            }
            Rule::StrengthOfVictory => {
                self.best_by(set, |team| self.standings.strength_of_victory(team))
            }
            Rule::StrengthOfSchedule => {
                self.best_by(set, |team| self.standings.strength_of_schedule(team))
            }
            Rule::ConferencePointsRank => {
                self.best_by(set, |team| -self.standings.combined_conference_rank(team))
            }
            Rule::LeaguePointsRank => {
                self.best_by(set, |team| -self.standings.combined_league_rank(team))
            }
            Rule::NetPointsCommon => {
                let common = self.common_opponents_checked(set)?;
                self.best_by(set, |team| self.net_points_against(team, common) as f64)
            }
            Rule::NetPointsAll => {
                self.best_by(set, |team| self.standings.standing(team).net_points() as f64)
            }
        }
    }

    /// Teams holding the best score, or `None` when the rule leaves
    /// the whole set tied.
    fn best_by<F>(&self, set: &[usize], score: F) -> Option<Vec<usize>>
    where
        F: Fn(usize) -> f64,
    {
        let scores: Vec<f64> = set.iter().map(|&team| score(team)).collect();
        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let winners: Vec<usize> = set
            .iter()
            .zip(&scores)
            .filter(|&(_, &s)| s == best)
            .map(|(&team, _)| team)
            .collect();

        (winners.len() < set.len()).then_some(winners)
    }

    /// Combined record of `team` in games against the other members of
    /// `set`, as a win percentage (0 when they never met).
    fn head_to_head_percentage(&self, team: usize, set: &[usize]) -> f64 {
        let mut wins = 0;
        let mut losses = 0;
        let mut ties = 0;

        for &opponent in set {
            if opponent == team {
                continue;
            }
            let (w, l, t) = self.standings.head_to_head(team, opponent);
            wins += w;
            losses += l;
            ties += t;
        }

        percentage_or_zero(wins, losses, ties)
    }

    /// The wild-card head-to-head rule: one team must have beaten
    /// every other member without losing to any of them. At most one
    /// team can qualify.
    fn sweep_winner(&self, set: &[usize]) -> Option<usize> {
        set.iter().copied().find(|&team| {
            set.iter().all(|&opponent| {
                if opponent == team {
                    return true;
                }
                let (wins, losses, _) = self.standings.head_to_head(team, opponent);
                wins > 0 && losses == 0
            })
        })
    }

    /// Opponents shared by the whole set, provided the set has played
    /// at least `MIN_COMMON_GAMES` resolved games against them.
    fn common_opponents_checked(&self, set: &[usize]) -> Option<u32> {
        let mask = self.schedule.common_opponents(set);
        if mask == 0 {
            return None;
        }

        let total: usize = set
            .iter()
            .map(|&team| self.games_against(team, mask).count())
            .sum();

        (total >= MIN_COMMON_GAMES).then_some(mask)
    }

    fn games_against(
        &self,
        team: usize,
        opponents: u32,
    ) -> impl Iterator<Item = (usize, GameOutcome)> + '_ {
        self.schedule.team_games(team).iter().filter_map(move |&index| {
            let game = &self.schedule.games()[index as usize];
            let opponent = if game.home == team { game.away } else { game.home };
            if opponents & (1 << opponent) == 0 {
                return None;
            }
            self.scores[index as usize].map(|outcome| (index as usize, outcome))
        })
    }

    fn record_against(&self, team: usize, opponents: u32) -> (u16, u16, u16) {
        let mut wins = 0;
        let mut losses = 0;
        let mut ties = 0;

        for (index, outcome) in self.games_against(team, opponents) {
            let is_home = self.schedule.games()[index].home == team;
            match (outcome.winner(), is_home) {
                (GameWinner::Tie, _) => ties += 1,
                (GameWinner::Home, true) | (GameWinner::Away, false) => wins += 1,
                _ => losses += 1,
            }
        }

        (wins, losses, ties)
    }

    fn net_points_against(&self, team: usize, opponents: u32) -> i64 {
        let mut net = 0i64;

        for (index, outcome) in self.games_against(team, opponents) {
            let is_home = self.schedule.games()[index].home == team;
            let diff = i64::from(outcome.home_score) - i64::from(outcome.away_score);
            net += if is_home { diff } else { -diff };
        }

        net
    }
}

/// Sub-record win percentage: unlike a full standing, an empty record
/// here scores zero so teams that never met fall through to the next
/// rule together.
fn percentage_or_zero(wins: u16, losses: u16, ties: u16) -> f64 {
    let games = wins + losses + ties;
    if games == 0 {
        return 0.0;
    }
    (f64::from(wins) + 0.5 * f64::from(ties)) / f64::from(games)
}
