use crate::{ApiResult, AppData};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use gridiron_core::Team;

pub fn team_routes() -> Router<AppData> {
    Router::new().route("/teams", get(teams_list_action))
}

async fn teams_list_action(State(state): State<AppData>) -> ApiResult<Json<Vec<Team>>> {
    let league = state.league.read().await;
    Ok(Json(league.teams.teams().to_vec()))
}
