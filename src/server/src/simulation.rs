use crate::{ApiError, ApiResult, AppData};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use gridiron_core::{simulate_season, CancellationToken, SimulationResult, TeamIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub fn simulation_routes() -> Router<AppData> {
    Router::new().route("/simulate", post(simulate_action))
}

fn default_num_simulations() -> i64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateRequest {
    /// Deserialized wide so a nonsense value fails our range check
    /// (400, with the field named) instead of the JSON layer's 422.
    #[serde(default = "default_num_simulations")]
    pub num_simulations: i64,
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl SimulateRequest {
    /// Trial count within [1, MAX_SIMULATIONS], or the 400 describing
    /// what was wrong with it.
    pub fn trials(&self) -> Result<usize, ApiError> {
        usize::try_from(self.num_simulations)
            .ok()
            .filter(|&trials| (1..=gridiron_core::MAX_SIMULATIONS).contains(&trials))
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "num_simulations must be between 1 and {}, got {}",
                    gridiron_core::MAX_SIMULATIONS,
                    self.num_simulations
                ))
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamStatsDto {
    pub average_wins: f64,
    pub playoff_probability: f64,
    pub division_win_probability: f64,
    pub first_seed_probability: f64,
    pub seed_probabilities: BTreeMap<String, f64>,
    pub missed_playoffs_probability: f64,
    pub wins_percentiles: BTreeMap<String, u16>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResultDto {
    pub num_simulations: usize,
    pub execution_time: f64,
    pub random_seed: u64,
    pub team_stats: BTreeMap<String, TeamStatsDto>,
}

impl SimulationResultDto {
    pub fn from_result(result: &SimulationResult, teams: &TeamIndex) -> Self {
        let team_stats = result
            .team_stats
            .iter()
            .enumerate()
            .map(|(index, stats)| {
                let seed_probabilities = stats
                    .seed_probabilities
                    .iter()
                    .enumerate()
                    .map(|(seed, &probability)| ((seed + 1).to_string(), probability))
                    .collect();
                let wins_percentiles = [10.0, 25.0, 50.0, 75.0, 90.0]
                    .into_iter()
                    .map(|pct| (format!("{}", pct as u8), stats.wins_percentile(pct)))
                    .collect();

                (
                    teams.get(index).id.clone(),
                    TeamStatsDto {
                        average_wins: stats.average_wins,
                        playoff_probability: stats.playoff_probability,
                        division_win_probability: stats.division_win_probability,
                        first_seed_probability: stats.first_seed_probability,
                        seed_probabilities,
                        missed_playoffs_probability: stats.missed_playoffs_probability,
                        wins_percentiles,
                    },
                )
            })
            .collect();

        SimulationResultDto {
            num_simulations: result.num_simulations,
            execution_time: result.duration.as_secs_f64(),
            random_seed: result.seed,
            team_stats,
        }
    }
}

/// Legacy synchronous entry point: runs the whole simulation on a
/// blocking thread and returns the result in one response. Long runs
/// belong on `/simulation-jobs`.
async fn simulate_action(
    State(state): State<AppData>,
    Json(request): Json<SimulateRequest>,
) -> ApiResult<Json<SimulationResultDto>> {
    let trials = request.trials()?;
    let (games, teams) = {
        let league = state.league.read().await;
        (league.games.clone(), league.teams.clone())
    };

    let result = tokio::task::spawn_blocking(move || {
        let cancel = CancellationToken::new();
        let result = simulate_season(
            &games,
            &teams,
            trials,
            request.random_seed,
            |_pct| {},
            &cancel,
        )?;
        Ok::<_, ApiError>(SimulationResultDto::from_result(&result, &teams))
    })
    .await
    .map_err(|err| ApiError::InternalError(format!("simulation task failed: {}", err)))??;

    Ok(Json(result))
}
