use crate::game::GameOutcome;
use crate::schedule::CompiledSchedule;
use crate::standings::StandingsCalculator;
use crate::team::{Conference, Division, TeamIndex};
use crate::tiebreaker::{TieBreaker, TieContext};
use rand::Rng;

/// Seeds 1..=7 for one conference, best first. Seeds 1-4 are the
/// division winners, 5-7 the wild cards in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConferenceSeeding {
    pub conference: Conference,
    pub seeds: Vec<usize>,
}

impl ConferenceSeeding {
    pub fn division_winners(&self) -> &[usize] {
        &self.seeds[..self.seeds.len().min(4)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayoffSeeding {
    pub conferences: [ConferenceSeeding; 2],
}

impl PlayoffSeeding {
    pub fn conference(&self, conference: Conference) -> &ConferenceSeeding {
        self.conferences
            .iter()
            .find(|seeding| seeding.conference == conference)
            .expect("both conferences are always seeded")
    }
}

/// Turns one trial's standings into playoff seeds.
pub struct PlayoffSeeder<'a> {
    teams: &'a TeamIndex,
    tie_breaker: TieBreaker<'a>,
}

impl<'a> PlayoffSeeder<'a> {
    pub fn new(
        schedule: &'a CompiledSchedule,
        teams: &'a TeamIndex,
        standings: &'a StandingsCalculator,
        scores: &'a [Option<GameOutcome>],
    ) -> Self {
        PlayoffSeeder {
            teams,
            tie_breaker: TieBreaker::new(schedule, teams, standings, scores),
        }
    }

    pub fn seed<R: Rng>(&self, rng: &mut R) -> PlayoffSeeding {
        PlayoffSeeding {
            conferences: [
                self.seed_conference(Conference::Afc, rng),
                self.seed_conference(Conference::Nfc, rng),
            ],
        }
    }

    pub fn seed_conference<R: Rng>(&self, conference: Conference, rng: &mut R) -> ConferenceSeeding {
        // Division winners first: best of each four-team division.
        let mut winners = Vec::with_capacity(4);
        for division in Division::ALL {
            let members = self.teams.division_members(conference, division);
            if members.is_empty() {
                continue;
            }
            winners.push(self.tie_breaker.best_of(&members, TieContext::Division, rng));
        }

        // Seeds 1-4: the winners ranked against each other. Their
        // head-to-head comparison is a plain record, so the division
        // procedure applies.
        let mut seeds = self.tie_breaker.order(&winners, TieContext::Division, rng);

        // Seeds 5-7: repeatedly take the best remaining non-winner by
        // the wild-card procedure.
        let mut candidates: Vec<usize> = self
            .teams
            .conference_members(conference)
            .into_iter()
            .filter(|team| !seeds.contains(team))
            .collect();

        for _ in 0..3 {
            if candidates.is_empty() {
                break;
            }
            let pick = self.tie_breaker.best_of(&candidates, TieContext::WildCard, rng);
            seeds.push(pick);
            candidates.retain(|&team| team != pick);
        }

        ConferenceSeeding { conference, seeds }
    }
}
