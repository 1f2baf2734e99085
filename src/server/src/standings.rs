use crate::{ApiResult, AppData};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use gridiron_core::{CompiledSchedule, StandingsCalculator};
use serde::Serialize;

pub fn standing_routes() -> Router<AppData> {
    Router::new().route("/standings", get(standings_list_action))
}

#[derive(Debug, Serialize)]
pub struct StandingDto {
    pub team_id: String,
    pub team_name: String,
    pub wins: u16,
    pub losses: u16,
    pub ties: u16,
    pub win_percentage: f64,
    pub division_wins: u16,
    pub division_losses: u16,
    pub division_ties: u16,
    pub conference_wins: u16,
    pub conference_losses: u16,
    pub conference_ties: u16,
    pub points_for: i64,
    pub points_against: i64,
    pub net_points: i64,
}

/// Current standings from completed and overridden games only.
async fn standings_list_action(State(state): State<AppData>) -> ApiResult<Json<Vec<StandingDto>>> {
    let league = state.league.read().await;

    let schedule = CompiledSchedule::compile(&league.games, &league.teams);
    let scores = schedule.baseline();
    let mut calculator = StandingsCalculator::new(league.teams.len());
    calculator.calculate(&schedule, &league.teams, &scores);

    let rows = league
        .teams
        .teams()
        .iter()
        .enumerate()
        .map(|(index, team)| {
            let standing = calculator.standing(index);
            StandingDto {
                team_id: team.id.clone(),
                team_name: team.name.clone(),
                wins: standing.wins,
                losses: standing.losses,
                ties: standing.ties,
                win_percentage: standing.win_percentage(),
                division_wins: standing.division_wins,
                division_losses: standing.division_losses,
                division_ties: standing.division_ties,
                conference_wins: standing.conference_wins,
                conference_losses: standing.conference_losses,
                conference_ties: standing.conference_ties,
                points_for: standing.points_for,
                points_against: standing.points_against,
                net_points: standing.net_points(),
            }
        })
        .collect();

    Ok(Json(rows))
}
