use crate::jobs::job_routes;
use crate::overrides::override_routes;
use crate::schedule::schedule_routes;
use crate::simulation::simulation_routes;
use crate::standings::standing_routes;
use crate::status::status_routes;
use crate::teams::team_routes;
use crate::AppData;
use axum::Router;

pub struct ServerRoutes;

impl ServerRoutes {
    pub fn create() -> Router<AppData> {
        Router::<AppData>::new()
            .merge(status_routes())
            .merge(team_routes())
            .merge(schedule_routes())
            .merge(standing_routes())
            .merge(simulation_routes())
            .merge(job_routes())
            .merge(override_routes())
    }
}
