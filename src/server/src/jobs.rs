use crate::simulation::{SimulateRequest, SimulationResultDto};
use crate::{ApiError, ApiResult, AppData};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use gridiron_core::{
    simulate_season, CancellationToken, Game, SimulationError, SimulationResult, TeamIndex,
    MAX_SIMULATIONS,
};
use log::{error, info};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use uuid::Uuid;

pub fn job_routes() -> Router<AppData> {
    Router::new()
        .route("/simulation-jobs", post(job_start_action))
        .route(
            "/simulation-jobs/{job_id}",
            get(job_get_action).delete(job_cancel_action),
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Cancelled,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Cancelled | JobStatus::Error
        )
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

/// Registry entry for one simulation job. Progress lives in an atomic
/// written straight from the simulation's progress callback; all other
/// fields change only under the registry lock.
struct JobRecord {
    id: String,
    num_simulations: usize,
    random_seed: Option<u64>,
    status: JobStatus,
    message: String,
    result: Option<Arc<SimulationResult>>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    teams: Arc<TeamIndex>,
    progress: Arc<AtomicU8>,
    cancel: CancellationToken,
}

impl JobRecord {
    fn snapshot(&self) -> JobDto {
        let progress = match self.status {
            JobStatus::Completed => 100,
            _ => self.progress.load(Ordering::Relaxed),
        };

        JobDto {
            job_id: self.id.clone(),
            status: self.status,
            progress,
            message: self.message.clone(),
            num_simulations: self.num_simulations,
            random_seed: self.random_seed,
            result: self
                .result
                .as_ref()
                .map(|result| SimulationResultDto::from_result(result, &self.teams)),
            error: self.error.clone(),
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            execution_time: self
                .result
                .as_ref()
                .map(|result| result.duration.as_secs_f64()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDto {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub num_simulations: usize,
    pub random_seed: Option<u64>,
    pub result: Option<SimulationResultDto>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub execution_time: Option<f64>,
}

/// Single-flight lifecycle manager for simulation jobs: at most one
/// job is pending or running at a time, cancellation is cooperative,
/// and terminal records are reaped when a new job starts or once they
/// outlive the TTL.
pub struct JobManager {
    jobs: Mutex<HashMap<String, JobRecord>>,
    ttl: Duration,
}

impl JobManager {
    pub fn new(ttl: Duration) -> Self {
        JobManager {
            jobs: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Registers a job and spawns its worker. Validation and the
    /// single-flight check both happen before any state changes.
    pub fn start(
        self: Arc<Self>,
        games: Vec<Game>,
        teams: TeamIndex,
        num_simulations: usize,
        random_seed: Option<u64>,
    ) -> ApiResult<JobDto> {
        if num_simulations == 0 || num_simulations > MAX_SIMULATIONS {
            return Err(ApiError::BadRequest(
                SimulationError::InvalidSimulationCount {
                    requested: num_simulations,
                }
                .to_string(),
            ));
        }

        let teams = Arc::new(teams);
        let record = {
            let mut jobs = self.lock_jobs();

            // A fresh start supersedes finished history.
            jobs.retain(|_, job| job.status.is_active());

            if !jobs.is_empty() {
                return Err(ApiError::Conflict(
                    "another simulation is already running".to_string(),
                ));
            }

            let id = Uuid::new_v4().to_string();
            let record = JobRecord {
                id: id.clone(),
                num_simulations,
                random_seed,
                status: JobStatus::Pending,
                message: format!("Queued {} simulations", num_simulations),
                result: None,
                error: None,
                created_at: Utc::now(),
                started_at: None,
                completed_at: None,
                teams: Arc::clone(&teams),
                progress: Arc::new(AtomicU8::new(0)),
                cancel: CancellationToken::new(),
            };
            let snapshot = record.snapshot();
            jobs.insert(id, record);
            snapshot
        };

        info!(
            "simulation job {} queued ({} trials)",
            record.job_id, record.num_simulations
        );

        let job_id = record.job_id.clone();
        tokio::spawn(async move {
            self.run_job(job_id, games, teams, num_simulations, random_seed)
                .await;
        });

        Ok(record)
    }

    /// Current snapshot of a job; `None` for unknown or reaped ids.
    pub fn get(&self, job_id: &str) -> Option<JobDto> {
        let mut jobs = self.lock_jobs();
        self.reap_expired(&mut jobs);
        jobs.get(job_id).map(JobRecord::snapshot)
    }

    /// Requests cancellation. Idempotent: terminal jobs are returned
    /// untouched, and the worker performs the actual transition at its
    /// next progress tick.
    pub fn cancel(&self, job_id: &str) -> Option<JobDto> {
        let jobs = self.lock_jobs();
        let job = jobs.get(job_id)?;

        if job.status.is_active() {
            job.cancel.cancel();
        }

        Some(job.snapshot())
    }

    pub fn has_active_job(&self) -> bool {
        self.lock_jobs().values().any(|job| job.status.is_active())
    }

    async fn run_job(
        self: Arc<Self>,
        job_id: String,
        games: Vec<Game>,
        teams: Arc<TeamIndex>,
        num_simulations: usize,
        random_seed: Option<u64>,
    ) {
        let (progress, cancel) = {
            let mut jobs = self.lock_jobs();
            let Some(job) = jobs.get_mut(&job_id) else {
                return;
            };
            job.status = JobStatus::Running;
            job.started_at = Some(Utc::now());
            job.message = format!("Running {} simulations...", job.num_simulations);
            (Arc::clone(&job.progress), job.cancel.clone())
        };

        let worker_cancel = cancel.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            simulate_season(
                &games,
                &teams,
                num_simulations,
                random_seed,
                move |pct| {
                    progress.fetch_max(pct, Ordering::Relaxed);
                },
                &worker_cancel,
            )
        })
        .await;

        let mut jobs = self.lock_jobs();
        let Some(job) = jobs.get_mut(&job_id) else {
            return;
        };
        job.completed_at = Some(Utc::now());

        match outcome {
            Ok(Ok(result)) => {
                info!(
                    "simulation job {} completed in {:.2}s",
                    job_id,
                    result.duration.as_secs_f64()
                );
                job.status = JobStatus::Completed;
                job.message = "Simulation complete".to_string();
                job.result = Some(Arc::new(result));
                job.progress.store(100, Ordering::Relaxed);
            }
            Ok(Err(SimulationError::Cancelled)) => {
                info!("simulation job {} cancelled", job_id);
                job.status = JobStatus::Cancelled;
                job.message = "Simulation cancelled".to_string();
            }
            Ok(Err(err)) => {
                error!("simulation job {} failed: {}", job_id, err);
                job.status = JobStatus::Error;
                job.message = "Simulation failed".to_string();
                job.error = Some(err.to_string());
            }
            Err(join_error) => {
                error!("simulation job {} worker panicked: {}", job_id, join_error);
                job.status = JobStatus::Error;
                job.message = "Simulation failed".to_string();
                job.error = Some(format!("simulation worker panicked: {}", join_error));
            }
        }
    }

    fn reap_expired(&self, jobs: &mut HashMap<String, JobRecord>) {
        let now = Utc::now();
        jobs.retain(|_, job| {
            if job.status.is_active() {
                return true;
            }
            let finished = job.completed_at.unwrap_or(job.created_at);
            match (now - finished).to_std() {
                Ok(age) => age <= self.ttl,
                Err(_) => true,
            }
        });
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, HashMap<String, JobRecord>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn job_start_action(
    State(state): State<AppData>,
    Json(request): Json<SimulateRequest>,
) -> ApiResult<Json<JobDto>> {
    let trials = request.trials()?;
    let (games, teams) = {
        let league = state.league.read().await;
        (league.games.clone(), league.teams.clone())
    };

    let job = Arc::clone(&state.jobs).start(games, teams, trials, request.random_seed)?;
    Ok(Json(job))
}

async fn job_get_action(
    State(state): State<AppData>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobDto>> {
    state
        .jobs
        .get(&job_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job '{}' not found", job_id)))
}

async fn job_cancel_action(
    State(state): State<AppData>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobDto>> {
    state
        .jobs
        .cancel(&job_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job '{}' not found", job_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_core::{Conference, Division, Team};
    use std::time::Duration as StdDuration;

    /// Eight AFC teams in two divisions, every pairing unresolved:
    /// enough structure for seeding without a full league.
    fn small_league() -> (Vec<Game>, TeamIndex) {
        let names = ["buf", "mia", "ne", "nyj", "bal", "cin", "cle", "pit"];
        let teams: Vec<Team> = names
            .iter()
            .enumerate()
            .map(|(i, id)| Team {
                id: id.to_string(),
                abbreviation: id.to_uppercase(),
                name: id.to_string(),
                display_name: id.to_string(),
                conference: Conference::Afc,
                division: if i < 4 { Division::East } else { Division::North },
            })
            .collect();

        let mut games = Vec::new();
        for a in 0..names.len() {
            for b in (a + 1)..names.len() {
                games.push(Game {
                    id: format!("g{}-{}", a, b),
                    week: 1,
                    home_team_id: names[a].to_string(),
                    away_team_id: names[b].to_string(),
                    home_score: None,
                    away_score: None,
                    is_completed: false,
                    is_overridden: false,
                    override_home_score: None,
                    override_away_score: None,
                });
            }
        }

        (games, TeamIndex::new(teams))
    }

    async fn wait_for_terminal(manager: &Arc<JobManager>, job_id: &str) -> JobDto {
        for _ in 0..600 {
            let job = manager.get(job_id).expect("job still registered");
            if job.status.is_terminal() {
                return job;
            }
            tokio::time::sleep(StdDuration::from_millis(50)).await;
        }
        panic!("job {} never reached a terminal state", job_id);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn job_runs_to_completion_with_result() {
        let manager = Arc::new(JobManager::new(StdDuration::from_secs(3600)));
        let (games, teams) = small_league();

        let job = Arc::clone(&manager)
            .start(games, teams, 500, Some(42))
            .unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, 0);
        assert!(job.result.is_none());

        let finished = wait_for_terminal(&manager, &job.job_id).await;
        assert_eq!(finished.status, JobStatus::Completed);
        assert_eq!(finished.progress, 100);
        assert!(finished.error.is_none());

        let result = finished.result.expect("completed job carries a result");
        assert_eq!(result.num_simulations, 500);
        assert_eq!(result.random_seed, 42);
        assert_eq!(result.team_stats.len(), 8);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn second_start_conflicts_while_a_job_is_active() {
        let manager = Arc::new(JobManager::new(StdDuration::from_secs(3600)));
        let (games, teams) = small_league();

        let first = Arc::clone(&manager)
            .start(games.clone(), teams.clone(), 500_000, Some(1))
            .unwrap();

        let second = Arc::clone(&manager).start(games, teams, 100, Some(2));
        assert!(matches!(second, Err(ApiError::Conflict(_))));

        manager.cancel(&first.job_id).unwrap();
        wait_for_terminal(&manager, &first.job_id).await;
        assert!(!manager.has_active_job());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancelled_job_surfaces_no_result_and_stays_cancelled() {
        let manager = Arc::new(JobManager::new(StdDuration::from_secs(3600)));
        let (games, teams) = small_league();

        let job = Arc::clone(&manager)
            .start(games, teams, 1_000_000, Some(7))
            .unwrap();

        // Progress snapshots must never go backwards while we poll.
        let mut last_progress = 0u8;
        for _ in 0..5 {
            tokio::time::sleep(StdDuration::from_millis(100)).await;
            let snapshot = manager.get(&job.job_id).unwrap();
            assert!(snapshot.progress >= last_progress);
            last_progress = snapshot.progress;
        }

        let cancelled = manager.cancel(&job.job_id).unwrap();
        assert!(
            cancelled.status == JobStatus::Cancelled || cancelled.status.is_active(),
            "cancel never invents a result"
        );

        let finished = wait_for_terminal(&manager, &job.job_id).await;
        assert_eq!(finished.status, JobStatus::Cancelled);
        assert!(finished.result.is_none());

        // Cancelling again is a no-op.
        let again = manager.cancel(&job.job_id).unwrap();
        assert_eq!(again.status, JobStatus::Cancelled);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_trial_counts_are_rejected_before_registration() {
        let manager = Arc::new(JobManager::new(StdDuration::from_secs(3600)));
        let (games, teams) = small_league();

        let err = Arc::clone(&manager)
            .start(games, teams, MAX_SIMULATIONS + 1, None)
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(!manager.has_active_job());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn starting_a_new_job_reaps_finished_history() {
        let manager = Arc::new(JobManager::new(StdDuration::from_secs(3600)));
        let (games, teams) = small_league();

        let first = Arc::clone(&manager)
            .start(games.clone(), teams.clone(), 200, Some(1))
            .unwrap();
        wait_for_terminal(&manager, &first.job_id).await;

        let second = Arc::clone(&manager).start(games, teams, 200, Some(2)).unwrap();
        wait_for_terminal(&manager, &second.job_id).await;

        assert!(manager.get(&first.job_id).is_none(), "first job was reaped");
        assert!(manager.get(&second.job_id).is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn expired_terminal_jobs_vanish_from_get() {
        let manager = Arc::new(JobManager::new(StdDuration::from_millis(50)));
        let (games, teams) = small_league();

        let job = Arc::clone(&manager).start(games, teams, 200, Some(1)).unwrap();

        // The job finishes, outlives its short TTL, and disappears.
        for _ in 0..600 {
            tokio::time::sleep(StdDuration::from_millis(50)).await;
            if manager.get(&job.job_id).is_none() {
                return;
            }
        }
        panic!("job {} was never reaped", job.job_id);
    }
}
