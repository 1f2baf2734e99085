//! Builders shared by the crate's test modules: the real 32-team
//! league and a synthetic 17-round schedule where every pairing is a
//! perfect matching (each team plays 17 distinct opponents).

use crate::game::Game;
use crate::team::{Conference, Division, Team, TeamIndex};

#[rustfmt::skip]
const LEAGUE: [(&str, &str, &str, &str, Conference, Division); 32] = [
    ("buf", "BUF", "Buffalo Bills", "Bills", Conference::Afc, Division::East),
    ("mia", "MIA", "Miami Dolphins", "Dolphins", Conference::Afc, Division::East),
    ("ne", "NE", "New England Patriots", "Patriots", Conference::Afc, Division::East),
    ("nyj", "NYJ", "New York Jets", "Jets", Conference::Afc, Division::East),
    ("bal", "BAL", "Baltimore Ravens", "Ravens", Conference::Afc, Division::North),
    ("cin", "CIN", "Cincinnati Bengals", "Bengals", Conference::Afc, Division::North),
    ("cle", "CLE", "Cleveland Browns", "Browns", Conference::Afc, Division::North),
    ("pit", "PIT", "Pittsburgh Steelers", "Steelers", Conference::Afc, Division::North),
    ("hou", "HOU", "Houston Texans", "Texans", Conference::Afc, Division::South),
    ("ind", "IND", "Indianapolis Colts", "Colts", Conference::Afc, Division::South),
    ("jax", "JAX", "Jacksonville Jaguars", "Jaguars", Conference::Afc, Division::South),
    ("ten", "TEN", "Tennessee Titans", "Titans", Conference::Afc, Division::South),
    ("den", "DEN", "Denver Broncos", "Broncos", Conference::Afc, Division::West),
    ("kc", "KC", "Kansas City Chiefs", "Chiefs", Conference::Afc, Division::West),
    ("lac", "LAC", "Los Angeles Chargers", "Chargers", Conference::Afc, Division::West),
    ("lv", "LV", "Las Vegas Raiders", "Raiders", Conference::Afc, Division::West),
    ("dal", "DAL", "Dallas Cowboys", "Cowboys", Conference::Nfc, Division::East),
    ("nyg", "NYG", "New York Giants", "Giants", Conference::Nfc, Division::East),
    ("phi", "PHI", "Philadelphia Eagles", "Eagles", Conference::Nfc, Division::East),
    ("wsh", "WSH", "Washington Commanders", "Commanders", Conference::Nfc, Division::East),
    ("chi", "CHI", "Chicago Bears", "Bears", Conference::Nfc, Division::North),
    ("det", "DET", "Detroit Lions", "Lions", Conference::Nfc, Division::North),
    ("gb", "GB", "Green Bay Packers", "Packers", Conference::Nfc, Division::North),
    ("min", "MIN", "Minnesota Vikings", "Vikings", Conference::Nfc, Division::North),
    ("atl", "ATL", "Atlanta Falcons", "Falcons", Conference::Nfc, Division::South),
    ("car", "CAR", "Carolina Panthers", "Panthers", Conference::Nfc, Division::South),
    ("no", "NO", "New Orleans Saints", "Saints", Conference::Nfc, Division::South),
    ("tb", "TB", "Tampa Bay Buccaneers", "Buccaneers", Conference::Nfc, Division::South),
    ("ari", "ARI", "Arizona Cardinals", "Cardinals", Conference::Nfc, Division::West),
    ("lar", "LAR", "Los Angeles Rams", "Rams", Conference::Nfc, Division::West),
    ("sea", "SEA", "Seattle Seahawks", "Seahawks", Conference::Nfc, Division::West),
    ("sf", "SF", "San Francisco 49ers", "49ers", Conference::Nfc, Division::West),
];

pub fn league_32() -> TeamIndex {
    let teams = LEAGUE
        .iter()
        .map(|&(id, abbreviation, name, display_name, conference, division)| Team {
            id: id.to_string(),
            abbreviation: abbreviation.to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
            conference,
            division,
        })
        .collect();

    TeamIndex::new(teams)
}

pub fn game(id: &str, week: u8, home: &str, away: &str) -> Game {
    Game {
        id: id.to_string(),
        week,
        home_team_id: home.to_string(),
        away_team_id: away.to_string(),
        home_score: None,
        away_score: None,
        is_completed: false,
        is_overridden: false,
        override_home_score: None,
        override_away_score: None,
    }
}

pub fn completed_game(id: &str, week: u8, home: &str, away: &str, home_score: u16, away_score: u16) -> Game {
    let mut g = game(id, week, home, away);
    g.is_completed = true;
    g.home_score = Some(home_score);
    g.away_score = Some(away_score);
    g
}

pub fn tied_game(id: &str, week: u8, home: &str, away: &str, score: u16) -> Game {
    completed_game(id, week, home, away, score, score)
}

/// 17 rounds of the circle method over the full league: 272 unresolved
/// games, every team playing 17 distinct opponents, home field
/// alternating by round.
pub fn round_robin_games(teams: &TeamIndex) -> Vec<Game> {
    let n = teams.len();
    assert!(n >= 2 && n % 2 == 0);

    let rounds = 17.min(n - 1);
    let mut rotation: Vec<usize> = (1..n).collect();
    let mut games = Vec::with_capacity(rounds * n / 2);

    for round in 0..rounds {
        let week = (round + 1) as u8;
        let mut pairs = vec![(0usize, rotation[0])];
        for i in 1..n / 2 {
            pairs.push((rotation[i], rotation[n - 1 - i]));
        }

        for (slot, (a, b)) in pairs.into_iter().enumerate() {
            let (home, away) = if (round + slot) % 2 == 0 { (a, b) } else { (b, a) };
            games.push(game(
                &format!("w{}g{}", week, slot + 1),
                week,
                &teams.get(home).id,
                &teams.get(away).id,
            ));
        }

        rotation.rotate_right(1);
    }

    games
}

/// Stamps deterministic completed results onto every game. Scores are
/// spread widely and never equal, so a season resolved this way cannot
/// reach the coin-toss rule.
pub fn resolve_all(games: &mut [Game], salt: u64) {
    let mut state = salt.wrapping_mul(0x9e3779b97f4a7c15).wrapping_add(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    for g in games.iter_mut() {
        let mut home = 3 + (next() % 38) as u16;
        let away = 3 + (next() % 38) as u16;
        if home == away {
            home += 1;
        }
        g.is_completed = true;
        g.home_score = Some(home);
        g.away_score = Some(away);
    }
}

/// Marks every game involving `team_id` as a blowout win for that team.
pub fn resolve_sweep(games: &mut [Game], team_id: &str) {
    for g in games.iter_mut() {
        if g.home_team_id == team_id {
            g.is_completed = true;
            g.home_score = Some(34);
            g.away_score = Some(10);
        } else if g.away_team_id == team_id {
            g.is_completed = true;
            g.home_score = Some(10);
            g.away_score = Some(34);
        }
    }
}
