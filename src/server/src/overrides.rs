use crate::{ApiError, ApiResult, AppData};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

pub fn override_routes() -> Router<AppData> {
    Router::new().route("/override", post(override_set_action))
}

fn default_is_overridden() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    pub game_id: String,
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    #[serde(default = "default_is_overridden")]
    pub is_overridden: bool,
}

/// Sets or clears a user override for one game, persisting the store
/// and stamping the in-memory schedule in the same write-lock scope.
async fn override_set_action(
    State(state): State<AppData>,
    Json(request): Json<OverrideRequest>,
) -> ApiResult<Json<Value>> {
    let mut league = state.league.write().await;

    let game = league
        .games
        .iter_mut()
        .find(|game| game.id == request.game_id)
        .ok_or_else(|| ApiError::NotFound(format!("Game '{}' not found", request.game_id)))?;

    if request.is_overridden {
        let (home_score, away_score) = match (request.home_score, request.away_score) {
            (Some(home), Some(away)) => (home, away),
            _ => {
                return Err(ApiError::BadRequest(
                    "home_score and away_score are required when is_overridden is true".to_string(),
                ))
            }
        };

        game.is_overridden = true;
        game.override_home_score = Some(home_score);
        game.override_away_score = Some(away_score);
        state.overrides.set(&request.game_id, home_score, away_score)?;
    } else {
        game.is_overridden = false;
        game.override_home_score = None;
        game.override_away_score = None;
        state.overrides.clear(&request.game_id)?;
    }

    Ok(Json(json!({ "ok": true })))
}
