use crate::{ApiResult, AppData};
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use gridiron_core::Game;
use serde::{Deserialize, Serialize};

pub fn schedule_routes() -> Router<AppData> {
    Router::new().route("/schedule", get(schedule_list_action))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub week: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct GameDto {
    pub id: String,
    pub week: u8,
    pub home_team_id: String,
    pub away_team_id: String,
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    pub is_completed: bool,
    pub is_overridden: bool,
    pub override_home_score: Option<u16>,
    pub override_away_score: Option<u16>,
    pub effective_home_score: Option<u16>,
    pub effective_away_score: Option<u16>,
}

impl GameDto {
    pub fn from_game(game: &Game) -> Self {
        let effective = game.effective_scores();

        GameDto {
            id: game.id.clone(),
            week: game.week,
            home_team_id: game.home_team_id.clone(),
            away_team_id: game.away_team_id.clone(),
            home_score: game.home_score,
            away_score: game.away_score,
            is_completed: game.is_completed,
            is_overridden: game.is_overridden,
            override_home_score: game.override_home_score,
            override_away_score: game.override_away_score,
            effective_home_score: effective.map(|(home, _)| home),
            effective_away_score: effective.map(|(_, away)| away),
        }
    }
}

async fn schedule_list_action(
    State(state): State<AppData>,
    Query(query): Query<ScheduleQuery>,
) -> ApiResult<Json<Vec<GameDto>>> {
    let league = state.league.read().await;

    let games = league
        .games
        .iter()
        .filter(|game| query.week.map_or(true, |week| game.week == week))
        .map(GameDto::from_game)
        .collect();

    Ok(Json(games))
}
