pub mod error;
pub mod game;
pub mod schedule;
pub mod seeding;
pub mod simulator;
pub mod standings;
pub mod team;
pub mod tiebreaker;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::SimulationError;
pub use game::{Game, GameOutcome, GameWinner};
pub use schedule::{CompiledGame, CompiledSchedule};
pub use seeding::{ConferenceSeeding, PlayoffSeeder, PlayoffSeeding};
pub use simulator::{
    simulate_season, CancellationToken, SimulationResult, TeamSimulationStats, MAX_SIMULATIONS,
    SCORE_MEAN,
};
pub use standings::{record_percentage, Standing, StandingsCalculator};
pub use team::{Conference, Division, Team, TeamIndex, GAMES_PER_TEAM, TEAM_COUNT};
pub use tiebreaker::{TieBreaker, TieContext};
