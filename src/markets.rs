use std::fmt;

use serde::{Deserialize, Serialize};

use crate::factors::round_to;
use crate::model::SidePair;
use crate::strength::clamp;

const BASE_CORNERS: f64 = 10.0;
const CORNERS_RANGE: (f64, f64) = (6.0, 14.0);
const BASE_CARDS: f64 = 4.0;
const CARDS_RANGE: (f64, f64) = (2.0, 7.0);

/// Expected total corners, rounded to 0.1.
pub fn corners(attack: SidePair<f64>, positions: SidePair<Option<u32>>, total_teams: u32) -> f64 {
    let attack_factor = 0.75 + (attack.home + attack.away) / 4.0 * 0.5;

    let position_factor = match table_places(positions, total_teams) {
        Some((home, away, n)) => {
            let top = n / 3.0;
            match (home <= top, away <= top) {
                (true, true) => 1.2,
                (true, false) | (false, true) => 1.1,
                (false, false) => 0.9,
            }
        }
        None => 1.0,
    };

    let total = BASE_CORNERS * attack_factor * position_factor;
    round_to(clamp(total, CORNERS_RANGE.0, CORNERS_RANGE.1), 1)
}

/// Expected total yellow cards, rounded to 0.1.
///
/// `motivation` takes the factors before ML reweighting.
pub fn cards(positions: SidePair<Option<u32>>, total_teams: u32, motivation: SidePair<f64>) -> f64 {
    let importance_factor = match table_places(positions, total_teams) {
        Some((home, away, n)) => {
            let top = n / 3.0;
            let relegation = n * 2.0 / 3.0;
            let critical = |p: f64| p <= top || p >= relegation;
            match (critical(home), critical(away)) {
                (true, true) => 1.3,
                (true, false) | (false, true) => 1.15,
                (false, false) => 0.9,
            }
        }
        None => 1.0,
    };

    let avg_motivation = (motivation.home + motivation.away) / 2.0;
    let motivation_factor = clamp(1.0 + (avg_motivation - 1.0) * 0.7, 0.75, 1.2);

    let total = BASE_CARDS * importance_factor * motivation_factor;
    round_to(clamp(total, CARDS_RANGE.0, CARDS_RANGE.1), 1)
}

fn table_places(positions: SidePair<Option<u32>>, total_teams: u32) -> Option<(f64, f64, f64)> {
    let home = positions.home.filter(|p| *p > 0)?;
    let away = positions.away.filter(|p| *p > 0)?;
    if total_teams == 0 {
        return None;
    }
    Some((home as f64, away as f64, total_teams as f64))
}

/// Both-teams-to-score bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BttsLabel {
    Yes,
    Likely,
    Unlikely,
    No,
}

impl BttsLabel {
    pub fn leans_yes(self) -> bool {
        matches!(self, BttsLabel::Yes | BttsLabel::Likely)
    }
}

impl fmt::Display for BttsLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BttsLabel::Yes => "Да",
            BttsLabel::Likely => "Скорее да",
            BttsLabel::Unlikely => "Скорее нет",
            BttsLabel::No => "Нет",
        };
        f.write_str(text)
    }
}

/// First matching rule wins.
pub fn btts_label(attack: SidePair<f64>, clean_sheets: SidePair<u32>) -> BttsLabel {
    let most_clean = clean_sheets.home.max(clean_sheets.away);
    if most_clean > 5 {
        return BttsLabel::Unlikely;
    }
    if attack.home >= 1.0 && attack.away >= 1.0 {
        if most_clean > 3 {
            BttsLabel::Likely
        } else {
            BttsLabel::Yes
        }
    } else if attack.home >= 0.7 && attack.away >= 0.7 {
        if most_clean > 2 {
            BttsLabel::Unlikely
        } else {
            BttsLabel::Likely
        }
    } else if most_clean > 3 {
        BttsLabel::No
    } else {
        BttsLabel::Unlikely
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair<T>(h: T, a: T) -> SidePair<T> {
        SidePair::new(h, a)
    }

    #[test]
    fn corners_scale_with_attack_and_table() {
        // attack_factor = 0.75 + 3.0 / 4 * 0.5 = 1.125
        assert_eq!(corners(pair(1.5, 1.5), pair(None, None), 20), 11.3);
        assert_eq!(corners(pair(1.5, 1.5), pair(Some(2), Some(5)), 20), 13.5);
        assert_eq!(corners(pair(1.5, 1.5), pair(Some(2), Some(12)), 20), 12.4);
        assert_eq!(corners(pair(1.5, 1.5), pair(Some(9), Some(12)), 20), 10.1);
    }

    #[test]
    fn corners_are_clamped() {
        assert_eq!(corners(pair(5.0, 5.0), pair(Some(1), Some(2)), 20), 14.0);
        assert_eq!(corners(pair(0.2, 0.2), pair(Some(10), Some(11)), 20), 7.2);
        assert_eq!(corners(pair(0.0, 0.0), pair(Some(10), Some(11)), 20), 6.8);
    }

    #[test]
    fn cards_use_critical_zones_and_motivation() {
        assert_eq!(cards(pair(None, None), 20, pair(1.0, 1.0)), 4.0);
        assert_eq!(cards(pair(Some(1), Some(19)), 20, pair(1.0, 1.0)), 5.2);
        assert_eq!(cards(pair(Some(1), Some(10)), 20, pair(1.0, 1.0)), 4.6);
        assert_eq!(cards(pair(Some(8), Some(10)), 20, pair(1.0, 1.0)), 3.6);
        // avg motivation 1.5 → 1.35, capped at 1.2
        assert_eq!(cards(pair(Some(1), Some(19)), 20, pair(1.5, 1.5)), 6.2);
        assert_eq!(cards(pair(Some(0), Some(19)), 20, pair(1.0, 1.0)), 4.0);
    }

    #[test]
    fn btts_rule_chain() {
        assert_eq!(btts_label(pair(2.0, 2.0), pair(6, 0)), BttsLabel::Unlikely);
        assert_eq!(btts_label(pair(1.2, 1.0), pair(1, 3)), BttsLabel::Yes);
        assert_eq!(btts_label(pair(1.2, 1.0), pair(4, 0)), BttsLabel::Likely);
        assert_eq!(btts_label(pair(0.8, 1.5), pair(0, 2)), BttsLabel::Likely);
        assert_eq!(btts_label(pair(0.8, 1.5), pair(3, 0)), BttsLabel::Unlikely);
        assert_eq!(btts_label(pair(0.5, 1.5), pair(4, 0)), BttsLabel::No);
        assert_eq!(btts_label(pair(0.5, 1.5), pair(0, 0)), BttsLabel::Unlikely);
    }

    #[test]
    fn btts_display_is_russian() {
        assert_eq!(BttsLabel::Likely.to_string(), "Скорее да");
        assert!(BttsLabel::Yes.leans_yes());
        assert!(!BttsLabel::No.leans_yes());
    }
}
