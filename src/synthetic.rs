//! Randomised fixtures for demos, benches and invariant sweeps.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{
    BookmakerOdds, H2hMeeting, InjuredPlayer, PredictionInput, SidePair, SportPerformance,
    TeamSeasonStats,
};
use crate::overlays::{HalfTendency, HalftimeProfile, Playstyle, WeatherReport};

const TEAMS: &[&str] = &[
    "Arsenal",
    "Chelsea",
    "Liverpool",
    "Real Madrid",
    "Barcelona",
    "Bayern Munich",
    "Inter",
    "Juventus",
    "Paris Saint-Germain",
    "Benfica",
    "Porto",
    "Ajax",
    "Celtic",
    "Galatasaray",
    "Getafe",
    "Brentford",
];

const LEAGUES: &[&str] = &[
    "Premier League",
    "La Liga",
    "UEFA Champions League",
    "UEFA Europa League",
    "FA Cup",
    "Friendly",
];

const BOOKMAKERS: &[&str] = &["Fonbet", "Winline", "Pinnacle"];

pub fn synthetic_inputs(rng: &mut impl Rng, n: usize) -> Vec<PredictionInput> {
    (0..n).map(|i| synthetic_input(rng, i as u64 + 1)).collect()
}

/// One fixture with every optional signal present about half the time.
pub fn synthetic_input(rng: &mut impl Rng, match_id: u64) -> PredictionInput {
    let mut picks = TEAMS.choose_multiple(rng, 2);
    let home = picks.next().copied().unwrap_or("Home FC");
    let away = picks.next().copied().unwrap_or("Away FC");
    let league = LEAGUES.choose(rng).copied().unwrap_or("Friendly");

    let mut input = PredictionInput::new(home, away, league);
    input.context.match_id = Some(match_id);
    input.context.home_id = Some(rng.gen_range(1..10_000));
    input.context.away_id = Some(rng.gen_range(10_000..20_000));

    let league_size = rng.gen_range(10..=24u32);
    if rng.gen_bool(0.8) {
        input.enriched.standings = vec![serde_json::Value::Null; league_size as usize];
    }
    if rng.gen_bool(0.9) {
        input.enriched.home_stats = Some(season_stats(rng, league_size));
    }
    if rng.gen_bool(0.9) {
        input.enriched.away_stats = Some(season_stats(rng, league_size));
    }
    let meetings = rng.gen_range(0..=6);
    input.enriched.h2h = (0..meetings)
        .map(|_| H2hMeeting {
            home_score: rng.gen_range(0..=4),
            away_score: rng.gen_range(0..=4),
        })
        .collect();

    input.performance = SidePair::new(
        rng.gen_bool(0.5).then(|| performance(rng)),
        rng.gen_bool(0.5).then(|| performance(rng)),
    );
    if rng.gen_bool(0.5) {
        input.weather = Some(WeatherReport {
            temperature_c: rng.gen_range(-10.0..38.0),
            wind_speed_ms: rng.gen_range(0.0..14.0),
            description: if rng.gen_bool(0.3) { "clear sky" } else { "clouds" }.to_string(),
            rain: rng.gen_bool(0.25),
            snow: rng.gen_bool(0.05),
            impact: None,
        });
    }
    for id in [input.context.home_id, input.context.away_id].into_iter().flatten() {
        let injured = rng.gen_range(0..=4);
        if injured > 0 {
            input.injuries.insert(
                id,
                (0..injured)
                    .map(|k| InjuredPlayer {
                        name: format!("Player {k}"),
                        reason: None,
                    })
                    .collect(),
            );
        }
    }
    if rng.gen_bool(0.5) {
        input.halftime = Some(SidePair::new(halftime(rng), halftime(rng)));
    }
    if rng.gen_bool(0.5) {
        input.playstyle = Some(SidePair::new(
            Playstyle::from_averages(rng.gen_range(0.5..2.8), rng.gen_range(0.4..2.2)),
            Playstyle::from_averages(rng.gen_range(0.5..2.8), rng.gen_range(0.4..2.2)),
        ));
    }
    for bookmaker in BOOKMAKERS {
        if rng.gen_bool(0.6) {
            input.odds.insert(
                bookmaker.to_string(),
                BookmakerOdds {
                    home: Some(rng.gen_range(1.2..6.0)),
                    draw: Some(rng.gen_range(2.8..4.5)),
                    away: Some(rng.gen_range(1.2..8.0)),
                },
            );
        }
    }
    input
}

fn season_stats(rng: &mut impl Rng, league_size: u32) -> TeamSeasonStats {
    let played = rng.gen_range(0..=38u32);
    let won = rng.gen_range(0..=played);
    let draw = rng.gen_range(0..=played - won);
    let lost = played - won - draw;
    let form_len = rng.gen_range(0..=6);
    let form = (0..form_len)
        .map(|_| ['W', 'D', 'L'][rng.gen_range(0..3)])
        .collect();
    TeamSeasonStats {
        played,
        won,
        draw,
        lost,
        goals_for: rng.gen_range(0..=played * 3),
        goals_against: rng.gen_range(0..=played * 3),
        position: rng.gen_bool(0.9).then(|| rng.gen_range(1..=league_size)),
        points: won * 3 + draw,
        form,
    }
}

fn performance(rng: &mut impl Rng) -> SportPerformance {
    SportPerformance {
        clean_sheets: rng.gen_range(0..=8),
        avg_goals_scored: if rng.gen_bool(0.2) {
            0.0
        } else {
            rng.gen_range(0.3..3.0)
        },
    }
}

fn halftime(rng: &mut impl Rng) -> HalftimeProfile {
    let tendency = [
        HalfTendency::FirstHalf,
        HalfTendency::SecondHalf,
        HalfTendency::Balanced,
    ][rng.gen_range(0..3)];
    HalftimeProfile {
        tendency,
        matches_analyzed: rng.gen_range(1..=10),
        avg_first_half_scored: rng.gen_range(0.0..2.0),
        avg_second_half_scored: rng.gen_range(0.0..2.0),
    }
}
