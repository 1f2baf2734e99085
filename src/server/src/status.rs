use crate::{ApiResult, AppData};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

pub fn status_routes() -> Router<AppData> {
    Router::new().route("/status", get(status_action))
}

async fn status_action(State(state): State<AppData>) -> ApiResult<Json<Value>> {
    let league = state.league.read().await;

    Ok(Json(json!({
        "status": "ok",
        "teams_loaded": league.teams.len(),
        "games_loaded": league.games.len(),
        "active_job": state.jobs.has_active_job(),
    })))
}
