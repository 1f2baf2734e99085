mod config;
mod error;
mod jobs;
mod overrides;
mod routes;
mod schedule;
mod simulation;
mod standings;
mod status;
mod teams;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use jobs::{JobDto, JobManager, JobStatus};
pub use simulation::{SimulateRequest, SimulationResultDto};

use crate::routes::ServerRoutes;
use axum::response::IntoResponse;
use gridiron_core::{Game, TeamIndex};
use gridiron_storage::OverrideStore;
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

/// The mutable league snapshot: team roster plus the schedule with
/// results and overrides stamped in. Overrides are the only writer
/// after startup.
pub struct LeagueState {
    pub teams: TeamIndex,
    pub games: Vec<Game>,
}

#[derive(Clone)]
pub struct AppData {
    pub league: Arc<RwLock<LeagueState>>,
    pub jobs: Arc<JobManager>,
    pub overrides: Arc<OverrideStore>,
}

pub struct SeasonSimulatorServer {
    data: AppData,
    port: u16,
}

impl SeasonSimulatorServer {
    pub fn new(data: AppData, port: u16) -> Self {
        SeasonSimulatorServer { data, port }
    }

    pub async fn run(&self) {
        let app = ServerRoutes::create()
            .layer(
                ServiceBuilder::new()
                    // Catch panics in handlers and convert them to 500 errors
                    .layer(CatchPanicLayer::custom(|_err| {
                        (
                            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                            "Internal server error - handler panicked".to_string(),
                        )
                            .into_response()
                    })),
            )
            .with_state(self.data.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind to address {}: {}", addr, e);
                panic!("Cannot start server without binding to port");
            }
        };

        info!("listen at: http://localhost:{}", self.port);

        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    }
}
