//! The prediction entry point: one `PredictionInput` in, one `PredictionResult` out.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::factors::{self, Adjustment, FactorRecord, round_to};
use crate::goals::{self, Outcome, Probabilities};
use crate::markets::{self, BttsLabel};
use crate::model::{MlWeights, PredictionInput, SidePair};
use crate::overlays::WeatherImpact;
use crate::pipeline::{self, Matchup};
use crate::strength::team_strength;
use crate::tables::LookupTables;
use crate::tips::{self, BettingTip};
use crate::value_bet::{self, ValueBet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub match_id: Option<u64>,
    pub home_team: String,
    pub away_team: String,
    pub league_name: String,
    pub kickoff: Option<String>,
    pub expected_home_goals: f64,
    pub expected_away_goals: f64,
    /// Sum of the final attacks, rounded to 0.01.
    pub total_goals: f64,
    pub home_total: f64,
    pub away_total: f64,
    pub expected_result: Outcome,
    pub result_label: String,
    pub confidence: f64,
    pub corners: f64,
    pub cards: f64,
    pub both_to_score: BttsLabel,
    pub betting_tips: Vec<BettingTip>,
    pub probabilities: Probabilities,
    pub value_bets: Vec<ValueBet>,
    pub home_position: Option<u32>,
    pub away_position: Option<u32>,
    pub notes: Vec<String>,
    pub factors: FactorRecord,
    pub strengths: Matchup,
}

/// Scores one fixture. Never fails: missing signals fall back to neutral values.
pub fn predict(input: &PredictionInput, config: &EngineConfig, tables: &LookupTables) -> PredictionResult {
    let ctx = &input.context;
    let home = ctx.home_team.as_str();
    let away = ctx.away_team.as_str();
    let home_stats = input.enriched.home_stats.as_ref();
    let away_stats = input.enriched.away_stats.as_ref();
    let forms = SidePair::new(
        home_stats.map_or("", |s| s.form.as_str()),
        away_stats.map_or("", |s| s.form.as_str()),
    );
    let positions = SidePair::new(
        home_stats.and_then(|s| s.position),
        away_stats.and_then(|s| s.position),
    );
    let league_size = league_size(input, config);
    let weights = input.ml_weights.unwrap_or(config.ml_weights);

    let record = collect_factors(input, weights, tables, league_size);
    let core = pipeline::run(record.base, &record.core_stages());
    let strengths = pipeline::run(core, &record.overlay_stages());
    debug!(
        home,
        away,
        home_attack = strengths.home.attack,
        away_attack = strengths.away.attack,
        home_defense = strengths.home.defense,
        away_defense = strengths.away.defense,
        "final strengths"
    );

    let corners = markets::corners(core.map(|t| t.attack), positions, league_size);
    let cards = markets::cards(
        positions,
        league_size,
        record.motivation.map(|a| a.original),
    );

    let clean_sheets = input
        .performance
        .map(|p| p.map_or(0, |s| s.clean_sheets));
    let final_attack = strengths.map(|t| t.attack);
    let both_to_score = markets::btts_label(final_attack, clean_sheets);

    let forecast = goals::resolve(&strengths, config.probability_model);
    let result_label = forecast.outcome.label(home, away);
    let total_goals = round_to(final_attack.home + final_attack.away, 2);
    let team_totals = final_attack.map(|a| round_to(a, 1));

    let betting_tips = tips::betting_tips(
        &result_label,
        total_goals,
        both_to_score,
        team_totals,
        SidePair::new(home, away),
    );

    let report = value_bet::analyze(&forecast.probabilities, &input.odds, config.min_value_edge);

    info!(
        home,
        away,
        result = forecast.outcome.as_str(),
        confidence = forecast.confidence,
        total_goals,
        "prediction ready"
    );

    PredictionResult {
        match_id: ctx.match_id,
        home_team: ctx.home_team.clone(),
        away_team: ctx.away_team.clone(),
        league_name: ctx.league_name.clone(),
        kickoff: ctx.kickoff.clone(),
        expected_home_goals: round_to(forecast.expected_home_goals, 2),
        expected_away_goals: round_to(forecast.expected_away_goals, 2),
        total_goals,
        home_total: team_totals.home,
        away_total: team_totals.away,
        expected_result: forecast.outcome,
        result_label,
        confidence: forecast.confidence,
        corners,
        cards,
        both_to_score,
        betting_tips,
        probabilities: forecast.probabilities,
        value_bets: report.value_bets,
        home_position: positions.home,
        away_position: positions.away,
        notes: notes(input, &record, forms),
        factors: record,
        strengths,
    }
}

/// Scores independent fixtures in parallel; output order follows input order.
pub fn predict_many(
    inputs: &[PredictionInput],
    config: &EngineConfig,
    tables: &LookupTables,
) -> Vec<PredictionResult> {
    inputs
        .par_iter()
        .map(|input| predict(input, config, tables))
        .collect()
}

/// Standings row count, or the configured default when none were supplied.
pub fn league_size(input: &PredictionInput, config: &EngineConfig) -> u32 {
    match input.enriched.standings.len() {
        0 => config.default_league_size,
        n => u32::try_from(n).unwrap_or(u32::MAX),
    }
}

/// Every raw factor for the fixture, weighted with `weights`.
pub fn collect_factors(
    input: &PredictionInput,
    weights: MlWeights,
    tables: &LookupTables,
    league_size: u32,
) -> FactorRecord {
    let ctx = &input.context;
    let enriched = &input.enriched;
    let home_stats = enriched.home_stats.as_ref();
    let away_stats = enriched.away_stats.as_ref();
    let home_form = home_stats.map_or("", |s| s.form.as_str());
    let away_form = away_stats.map_or("", |s| s.form.as_str());

    let base = Matchup::new(
        team_strength(home_stats, true, home_form, &ctx.home_team, tables),
        team_strength(away_stats, false, away_form, &ctx.away_team, tables),
    );

    let league_ratio = factors::league_ratios(&ctx.home_team, &ctx.away_team, tables);
    if let Some(ratio) = league_ratio {
        debug!(home = ratio.home, away = ratio.away, "cross-league ratios");
    }

    let h2h = factors::analyze_h2h(&enriched.h2h);
    let importance = tables.tournament_importance(&ctx.league_name);
    let motivation = SidePair::new(
        factors::motivation_factor(home_stats.and_then(|s| s.position), league_size, importance),
        factors::motivation_factor(away_stats.and_then(|s| s.position), league_size, importance),
    );
    let streak = SidePair::new(
        factors::analyze_streak(home_form).factor,
        factors::analyze_streak(away_form).factor,
    );

    let sport_avg_goals = input
        .performance
        .map(|p| p.map(|s| s.avg_goals_scored));

    let injuries = SidePair::new(
        input.injury_count(ctx.home_id),
        input.injury_count(ctx.away_id),
    );

    let halftime_adjustment = input
        .halftime
        .map(|h| factors::halftime_adjustment(h.home.tendency, h.away.tendency));
    let playstyle = input
        .playstyle
        .map(|p| p.map(|style| factors::playstyle_adjustment(&style)));
    let counter_attack = input
        .playstyle
        .and_then(|p| factors::counter_attack_side(&p.home, &p.away));

    let record = FactorRecord {
        weights,
        base,
        league_ratio,
        h2h: h2h.factor.map(|f| Adjustment::with_weight(f, weights.h2h)),
        motivation: motivation.map(|f| Adjustment::with_weight(f, weights.motivation)),
        streak: streak.map(|f| Adjustment::with_weight(f, weights.streak)),
        sport_avg_goals,
        weather_adjustment: input.weather.as_ref().map(|w| w.impact().goals_adjustment()),
        injuries,
        halftime_adjustment,
        playstyle,
        counter_attack,
    };
    debug!(
        importance,
        league_size,
        h2h_home = record.h2h.home.original,
        h2h_away = record.h2h.away.original,
        motivation_home = record.motivation.home.original,
        motivation_away = record.motivation.away.original,
        streak_home = record.streak.home.original,
        streak_away = record.streak.away.original,
        "contextual factors"
    );
    record
}

fn notes(input: &PredictionInput, record: &FactorRecord, forms: SidePair<&str>) -> Vec<String> {
    let home = input.context.home_team.as_str();
    let away = input.context.away_team.as_str();
    let mut notes = Vec::new();

    if let Some(summary) = factors::analyze_h2h(&input.enriched.h2h).summary(home) {
        notes.push(summary);
    }
    if let Some(form) = form_analysis(home, away, forms) {
        notes.push(form);
    }

    if let Some(weather) = &input.weather {
        let conditions = weather.conditions();
        notes.push(match weather.impact() {
            WeatherImpact::Negative => format!("🌧️ Погода снижает голы: {conditions}"),
            WeatherImpact::SlightNegative => {
                format!("☁️ Погода немного снижает голы: {conditions}")
            }
            WeatherImpact::Positive => format!("☀️ Идеальные условия для игры: {conditions}"),
            WeatherImpact::Neutral => format!("🌤️ Погода: {conditions}"),
        });
    }

    if record.injuries.home > 0 || record.injuries.away > 0 {
        notes.push(format!(
            "🏥 Травмы: {home} ({}), {away} ({})",
            record.injuries.home, record.injuries.away
        ));
    }

    if let Some(h) = &input.halftime {
        notes.push(format!(
            "⏱️ Тенденции: {home} - {}, {away} - {}",
            h.home.tendency.label(),
            h.away.tendency.label()
        ));
    }

    if let Some(p) = &input.playstyle {
        notes.push(format!(
            "🎯 Стиль: {home} - {}, {away} - {}",
            p.home.description(),
            p.away.description()
        ));
    }
    notes
}

fn form_analysis(home: &str, away: &str, forms: SidePair<&str>) -> Option<String> {
    if forms.home.is_empty() && forms.away.is_empty() {
        return None;
    }
    let home_streak = factors::analyze_streak(forms.home).description;
    let away_streak = factors::analyze_streak(forms.away).description;
    let text = match (home_streak, away_streak) {
        (Some(h), Some(a)) => format!("{home}: {h} | {away}: {a}"),
        (Some(h), None) => format!("{home}: {h}"),
        (None, Some(a)) => format!("{away}: {a}"),
        (None, None) => {
            let home_wins = forms.home.chars().filter(|c| *c == 'W').count();
            let away_wins = forms.away.chars().filter(|c| *c == 'W').count();
            if home_wins > away_wins + 1 {
                format!("{home} в отличной форме 🔥")
            } else if away_wins > home_wins + 1 {
                format!("{away} в отличной форме 🔥")
            } else {
                "Команды в сопоставимой форме".to_string()
            }
        }
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{H2hMeeting, TeamSeasonStats};

    fn stats(played: u32, gf: u32, ga: u32, position: u32, form: &str) -> TeamSeasonStats {
        TeamSeasonStats {
            played,
            goals_for: gf,
            goals_against: ga,
            position: Some(position),
            form: form.to_string(),
            ..TeamSeasonStats::default()
        }
    }

    #[test]
    fn empty_input_still_predicts() {
        let input = PredictionInput::new("Home FC", "Away FC", "");
        let r = predict(&input, &EngineConfig::default(), LookupTables::builtin());
        assert_eq!(r.betting_tips.len(), 3);
        assert!(r.value_bets.is_empty());
        assert!(r.notes.is_empty());
        assert!((0.0..=100.0).contains(&r.confidence));
    }

    #[test]
    fn league_size_defaults_when_standings_missing() {
        let mut input = PredictionInput::new("A", "B", "");
        let config = EngineConfig::default();
        assert_eq!(league_size(&input, &config), 20);
        input.enriched.standings = vec![serde_json::Value::Null; 18];
        assert_eq!(league_size(&input, &config), 18);
    }

    #[test]
    fn record_replays_to_final_strengths() {
        let mut input = PredictionInput::new("Arsenal", "Celtic", "UEFA Champions League");
        input.enriched.home_stats = Some(stats(10, 22, 8, 2, "WWDWW"));
        input.enriched.away_stats = Some(stats(10, 15, 12, 5, "LWLDL"));
        input.enriched.h2h = vec![H2hMeeting { home_score: 2, away_score: 0 }; 3];
        let r = predict(&input, &EngineConfig::default(), LookupTables::builtin());
        assert_eq!(r.factors.replay(), r.strengths);
        assert!(r.factors.league_ratio.is_some());
    }

    #[test]
    fn form_notes() {
        let t = |h, a| form_analysis("A", "B", SidePair::new(h, a));
        assert_eq!(t("", ""), None);
        assert_eq!(t("WWW", "").unwrap(), "A: 3 победы подряд! 🔥");
        assert_eq!(t("WLD", "DWL").unwrap(), "Команды в сопоставимой форме");
        assert_eq!(t("WWLWD", "DWL").unwrap(), "A в отличной форме 🔥");
    }
}
