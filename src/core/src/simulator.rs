use crate::error::SimulationError;
use crate::game::{Game, GameOutcome};
use crate::schedule::CompiledSchedule;
use crate::seeding::PlayoffSeeder;
use crate::standings::StandingsCalculator;
use crate::team::{TeamIndex, GAMES_PER_TEAM};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Poisson};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const MAX_SIMULATIONS: usize = 1_000_000;

/// Poisson mean for a single team's points in a simulated game.
pub const SCORE_MEAN: f64 = 22.5;

/// Trials each worker should own at minimum; below this, fewer
/// workers are used than cores are available.
const TRIALS_PER_WORKER: usize = 1_000;

/// Cooperative cancellation flag shared between the orchestrator and
/// the trial workers. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-team accumulators across all trials. Plain sums, so worker
/// blocks merge by addition in any order.
#[derive(Debug, Clone)]
struct TeamCounters {
    wins_sum: u64,
    wins_histogram: [u64; GAMES_PER_TEAM + 1],
    seed_counts: [u64; 7],
    division_titles: u64,
    missed_playoffs: u64,
}

impl Default for TeamCounters {
    fn default() -> Self {
        TeamCounters {
            wins_sum: 0,
            wins_histogram: [0; GAMES_PER_TEAM + 1],
            seed_counts: [0; 7],
            division_titles: 0,
            missed_playoffs: 0,
        }
    }
}

impl TeamCounters {
    fn merge(&mut self, other: &TeamCounters) {
        self.wins_sum += other.wins_sum;
        for (into, from) in self.wins_histogram.iter_mut().zip(&other.wins_histogram) {
            *into += from;
        }
        for (into, from) in self.seed_counts.iter_mut().zip(&other.seed_counts) {
            *into += from;
        }
        self.division_titles += other.division_titles;
        self.missed_playoffs += other.missed_playoffs;
    }
}

/// Empirical per-team frequencies over the executed trials.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSimulationStats {
    pub average_wins: f64,
    pub playoff_probability: f64,
    pub division_win_probability: f64,
    pub first_seed_probability: f64,
    /// Index 0 is seed 1.
    pub seed_probabilities: [f64; 7],
    pub missed_playoffs_probability: f64,
    pub wins_histogram: [u64; GAMES_PER_TEAM + 1],
}

impl TeamSimulationStats {
    /// Win total at the given percentile of the empirical
    /// distribution (e.g. 50.0 for the median).
    pub fn wins_percentile(&self, percentile: f64) -> u16 {
        let total: u64 = self.wins_histogram.iter().sum();
        if total == 0 {
            return 0;
        }

        let target = ((percentile / 100.0) * total as f64).ceil().max(1.0) as u64;
        let mut seen = 0u64;
        for (wins, &count) in self.wins_histogram.iter().enumerate() {
            seen += count;
            if seen >= target {
                return wins as u16;
            }
        }
        GAMES_PER_TEAM as u16
    }
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub num_simulations: usize,
    pub duration: Duration,
    /// The seed actually used; pass it back in to replay the run.
    pub seed: u64,
    /// Indexed by the dense team index.
    pub team_stats: Vec<TeamSimulationStats>,
}

/// Runs `num_simulations` independent season trials and aggregates
/// per-team playoff statistics.
///
/// Every unresolved game is a fair coin flip; scores are drawn from
/// Poisson(SCORE_MEAN) pairs, redrawn until the winner leads, so the
/// point-differential tiebreakers always have inputs. Trials are
/// partitioned across workers, each with its own seeded stream, which
/// makes a seeded run reproducible regardless of scheduling.
///
/// `progress` is invoked with 0..=100 roughly every 1% of trials; the
/// cancel token is checked at each tick and on every trial entry.
pub fn simulate_season<F>(
    games: &[Game],
    teams: &TeamIndex,
    num_simulations: usize,
    random_seed: Option<u64>,
    progress: F,
    cancel: &CancellationToken,
) -> Result<SimulationResult, SimulationError>
where
    F: Fn(u8) + Sync,
{
    if num_simulations == 0 || num_simulations > MAX_SIMULATIONS {
        return Err(SimulationError::InvalidSimulationCount {
            requested: num_simulations,
        });
    }

    let started = Instant::now();
    let seed = random_seed.unwrap_or_else(|| rand::thread_rng().gen());

    let schedule = CompiledSchedule::compile(games, teams);
    let baseline = schedule.baseline();

    info!(
        "starting {} simulations: {} games fixed, {} to simulate (seed {})",
        num_simulations,
        schedule.games().len() - schedule.unresolved().len(),
        schedule.unresolved().len(),
        seed
    );

    let workers = (num_simulations / TRIALS_PER_WORKER)
        .clamp(1, rayon::current_num_threads().max(1));
    let base = num_simulations / workers;
    let remainder = num_simulations % workers;

    let tick = (num_simulations / 100).max(1);
    let completed = AtomicUsize::new(0);

    let blocks: Result<Vec<Vec<TeamCounters>>, SimulationError> = (0..workers)
        .into_par_iter()
        .map(|worker| {
            let trials = base + usize::from(worker < remainder);
            let mut rng = ChaCha8Rng::seed_from_u64(seed ^ worker as u64);
            run_worker(
                &schedule,
                teams,
                &baseline,
                trials,
                num_simulations,
                tick,
                &completed,
                &progress,
                cancel,
                &mut rng,
            )
        })
        .collect();

    let blocks = blocks?;
    let mut counters = vec![TeamCounters::default(); teams.len()];
    for block in &blocks {
        for (into, from) in counters.iter_mut().zip(block) {
            into.merge(from);
        }
    }

    progress(100);

    let duration = started.elapsed();
    info!(
        "simulations complete in {:.2}s ({:.0} trials/sec)",
        duration.as_secs_f64(),
        num_simulations as f64 / duration.as_secs_f64().max(f64::EPSILON)
    );

    let trials = num_simulations as f64;
    let team_stats = counters
        .into_iter()
        .map(|c| {
            let seeded = c.seed_counts.iter().sum::<u64>();
            TeamSimulationStats {
                average_wins: c.wins_sum as f64 / trials,
                playoff_probability: seeded as f64 / trials,
                division_win_probability: c.division_titles as f64 / trials,
                first_seed_probability: c.seed_counts[0] as f64 / trials,
                seed_probabilities: c.seed_counts.map(|count| count as f64 / trials),
                missed_playoffs_probability: c.missed_playoffs as f64 / trials,
                wins_histogram: c.wins_histogram,
            }
        })
        .collect();

    Ok(SimulationResult {
        num_simulations,
        duration,
        seed,
        team_stats,
    })
}

#[allow(clippy::too_many_arguments)]
fn run_worker<F>(
    schedule: &CompiledSchedule,
    teams: &TeamIndex,
    baseline: &[Option<GameOutcome>],
    trials: usize,
    num_simulations: usize,
    tick: usize,
    completed: &AtomicUsize,
    progress: &F,
    cancel: &CancellationToken,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<TeamCounters>, SimulationError>
where
    F: Fn(u8) + Sync,
{
    let points = Poisson::new(SCORE_MEAN).expect("score mean is positive");
    let mut scores = baseline.to_vec();
    let mut standings = StandingsCalculator::new(teams.len());
    let mut counters = vec![TeamCounters::default(); teams.len()];

    for _ in 0..trials {
        if cancel.is_cancelled() {
            return Err(SimulationError::Cancelled);
        }

        for &index in schedule.unresolved() {
            scores[index as usize] = Some(flip_game(&points, rng));
        }

        standings.calculate(schedule, teams, &scores);

        let seeder = PlayoffSeeder::new(schedule, teams, &standings, &scores);
        let seeding = seeder.seed(rng);

        let mut seeded = 0u64;
        for conference in &seeding.conferences {
            for (position, &team) in conference.seeds.iter().enumerate() {
                counters[team].seed_counts[position] += 1;
                if position < 4 {
                    counters[team].division_titles += 1;
                }
                seeded |= 1 << team;
            }
        }

        for (team, team_counters) in counters.iter_mut().enumerate() {
            let wins = standings.standing(team).wins;
            team_counters.wins_sum += u64::from(wins);
            team_counters.wins_histogram[(wins as usize).min(GAMES_PER_TEAM)] += 1;
            if seeded & (1 << team) == 0 {
                team_counters.missed_playoffs += 1;
            }
        }

        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % tick == 0 {
            if cancel.is_cancelled() {
                return Err(SimulationError::Cancelled);
            }
            progress(((done * 100) / num_simulations).min(100) as u8);
        }
    }

    Ok(counters)
}

/// One simulated game: a fair coin for the winner, then Poisson score
/// pairs redrawn until they agree with it. Simulated games never tie.
fn flip_game<R: Rng>(points: &Poisson<f64>, rng: &mut R) -> GameOutcome {
    let home_wins = rng.gen_bool(0.5);

    loop {
        let home_score = points.sample(rng) as u16;
        let away_score = points.sample(rng) as u16;

        if (home_wins && home_score > away_score) || (!home_wins && away_score > home_score) {
            return GameOutcome {
                home_score,
                away_score,
            };
        }
    }
}
