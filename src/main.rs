use env_logger::Env;
use gridiron_core::utils::TimeEstimation;
use gridiron_core::{Game, Team, TeamIndex};
use gridiron_server::{AppData, JobManager, LeagueState, SeasonSimulatorServer, ServerConfig};
use gridiron_storage::{
    apply_results, load_results, load_schedule, load_teams, CacheStore, OverrideStore, StorageError,
};
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let config = ServerConfig::from_env();

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str())).init();

    let store = CacheStore::open(&config.cache_directory)?;

    let (loaded, estimated) = TimeEstimation::estimate(
        || -> Result<(Vec<Team>, Vec<Game>, OverrideStore), StorageError> {
            let teams = load_teams(&store)?;
            let mut games = load_schedule(&store)?;

            let results = load_results(&store)?;
            apply_results(&mut games, &results);

            let overrides = OverrideStore::load(store.clone())?;
            overrides.apply(&mut games);

            Ok((teams, games, overrides))
        },
    );
    let (teams, games, overrides) = loaded?;

    info!(
        "cache loaded: {} teams, {} games in {} ms",
        teams.len(),
        games.len(),
        estimated
    );

    let data = AppData {
        league: Arc::new(RwLock::new(LeagueState {
            teams: TeamIndex::new(teams),
            games,
        })),
        jobs: Arc::new(JobManager::new(config.job_ttl)),
        overrides: Arc::new(overrides),
    };

    SeasonSimulatorServer::new(data, config.port).run().await;

    Ok(())
}
