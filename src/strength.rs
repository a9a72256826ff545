use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::TeamSeasonStats;
use crate::tables::LookupTables;

pub const ATTACK_RANGE: (f64, f64) = (0.4, 3.0);
pub const DEFENSE_RANGE: (f64, f64) = (0.6, 2.0);

const ELITE_ATTACK: f64 = 1.12;
const ELITE_DEFENSE: f64 = 0.90;
const HOME_ATTACK: f64 = 1.10;
const HOME_DEFENSE: f64 = 0.95;
const FORM_ATTACK_SWING: f64 = 0.18;
const FORM_DEFENSE_SWING: f64 = 0.12;

/// Goals-for and goals-against rates for one side, per match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    pub attack: f64,
    pub defense: f64,
}

impl TeamState {
    pub fn clamped(self) -> Self {
        Self {
            attack: clamp(self.attack, ATTACK_RANGE.0, ATTACK_RANGE.1),
            defense: clamp(self.defense, DEFENSE_RANGE.0, DEFENSE_RANGE.1),
        }
    }
}

/// Base strength from season stats, before any contextual factor.
///
/// Multipliers compound in a fixed order (elite, home venue, form) and the
/// result is clamped once at the end.
pub fn team_strength(
    stats: Option<&TeamSeasonStats>,
    is_home: bool,
    form: &str,
    team_name: &str,
    tables: &LookupTables,
) -> TeamState {
    let Some(stats) = stats.filter(|s| !s.is_empty()) else {
        let fallback = if is_home {
            TeamState { attack: 1.3, defense: 1.2 }
        } else {
            TeamState { attack: 1.1, defense: 1.3 }
        };
        debug!(team = team_name, ?fallback, "no season stats, using defaults");
        return fallback;
    };

    let played = stats.played.max(1) as f64;
    let mut attack = stats.goals_for as f64 / played;
    let mut defense = stats.goals_against as f64 / played;

    if tables.is_elite(team_name) {
        attack *= ELITE_ATTACK;
        defense *= ELITE_DEFENSE;
    }

    if is_home {
        attack *= HOME_ATTACK;
        defense *= HOME_DEFENSE;
    }

    if let Some(score) = form_score(form) {
        attack *= 1.0 + FORM_ATTACK_SWING * score;
        defense *= 1.0 - FORM_DEFENSE_SWING * score;
    }

    let state = TeamState { attack, defense }.clamped();
    debug!(
        team = team_name,
        is_home,
        form,
        attack = state.attack,
        defense = state.defense,
        "team strength"
    );
    state
}

/// (wins - losses) / length, in [-1, 1]; `None` for fewer than three results.
///
/// Characters other than `W`/`L` still count toward the length.
pub fn form_score(form: &str) -> Option<f64> {
    let len = form.chars().count();
    if len < 3 {
        return None;
    }
    let wins = form.chars().filter(|c| *c == 'W').count() as f64;
    let losses = form.chars().filter(|c| *c == 'L').count() as f64;
    Some((wins - losses) / len as f64)
}

pub(crate) fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(played: u32, gf: u32, ga: u32) -> TeamSeasonStats {
        TeamSeasonStats {
            played,
            goals_for: gf,
            goals_against: ga,
            ..TeamSeasonStats::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn missing_stats_use_venue_defaults() {
        let t = LookupTables::builtin();
        assert_eq!(
            team_strength(None, true, "WWW", "Arsenal", t),
            TeamState { attack: 1.3, defense: 1.2 }
        );
        assert_eq!(
            team_strength(None, false, "", "Getafe", t),
            TeamState { attack: 1.1, defense: 1.3 }
        );
    }

    #[test]
    fn blank_record_counts_as_missing() {
        let t = LookupTables::builtin();
        let blank = TeamSeasonStats::default();
        assert_eq!(
            team_strength(Some(&blank), true, "", "Getafe", t),
            team_strength(None, true, "", "Getafe", t)
        );
        assert_eq!(
            team_strength(Some(&blank), false, "", "Getafe", t),
            TeamState { attack: 1.1, defense: 1.3 }
        );
    }

    #[test]
    fn plain_rates_for_unknown_away_team() {
        let s = team_strength(Some(&stats(10, 15, 12)), false, "", "Getafe", LookupTables::builtin());
        assert!(close(s.attack, 1.5));
        assert!(close(s.defense, 1.2));
    }

    #[test]
    fn zero_played_is_floored() {
        let s = team_strength(Some(&stats(0, 2, 1)), false, "", "Getafe", LookupTables::builtin());
        assert!(close(s.attack, 2.0));
        assert!(close(s.defense, 1.0));
    }

    #[test]
    fn multipliers_compound_in_order() {
        // Elite, home, then form "WWWDL": score = (3 - 1) / 5 = 0.4.
        let s = team_strength(
            Some(&stats(10, 15, 10)),
            true,
            "WWWDL",
            "Real Madrid",
            LookupTables::builtin(),
        );
        let attack = 1.5 * 1.12 * 1.10 * (1.0 + 0.18 * 0.4);
        let defense = 1.0 * 0.90 * 0.95 * (1.0 - 0.12 * 0.4);
        assert!(close(s.attack, attack));
        assert!(close(s.defense, defense));
    }

    #[test]
    fn short_form_is_ignored() {
        let t = LookupTables::builtin();
        let with = team_strength(Some(&stats(10, 15, 12)), false, "WW", "Getafe", t);
        let without = team_strength(Some(&stats(10, 15, 12)), false, "", "Getafe", t);
        assert_eq!(with, without);
    }

    #[test]
    fn final_values_are_clamped() {
        let t = LookupTables::builtin();
        let s = team_strength(Some(&stats(5, 30, 0)), true, "WWWWW", "Getafe", t);
        assert_eq!(s, TeamState { attack: 3.0, defense: 0.6 });
        let s = team_strength(Some(&stats(10, 1, 40)), false, "LLLLL", "Getafe", t);
        assert_eq!(s, TeamState { attack: 0.4, defense: 2.0 });
    }

    #[test]
    fn form_score_treats_unknown_chars_as_neutral() {
        assert_eq!(form_score("W?L"), Some(0.0));
        assert_eq!(form_score("WWx"), Some(2.0 / 3.0));
        assert_eq!(form_score("L"), None);
    }
}
