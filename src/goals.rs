//! Expected goals, outcome decision and outcome probabilities.

use serde::{Deserialize, Serialize};

use crate::config::ProbabilityModel;
use crate::factors::round_to;
use crate::pipeline::Matchup;
use crate::strength::clamp;

pub const HOME_BASE: f64 = 1.30;
pub const AWAY_BASE: f64 = 1.20;
pub const WIN_MARGIN: f64 = 0.35;
pub const DRAW_MARGIN: f64 = 0.20;

const DEFENSE_INDEX: (f64, f64) = (0.7, 1.15);
const EXPECTED_GOALS: (f64, f64) = (0.3, 3.0);
const DEFENSE_PIVOT: f64 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::HomeWin, Outcome::Draw, Outcome::AwayWin];

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::HomeWin => "home_win",
            Outcome::Draw => "draw",
            Outcome::AwayWin => "away_win",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Outcome::ALL.into_iter().find(|o| o.as_str() == raw)
    }

    pub fn from_score(home_goals: u32, away_goals: u32) -> Self {
        match home_goals.cmp(&away_goals) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Less => Outcome::AwayWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    /// "Победа <team>" or "Ничья".
    pub fn label(self, home_team: &str, away_team: &str) -> String {
        match self {
            Outcome::HomeWin => format!("Победа {home_team}"),
            Outcome::AwayWin => format!("Победа {away_team}"),
            Outcome::Draw => "Ничья".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}

impl Probabilities {
    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::HomeWin => self.home_win,
            Outcome::Draw => self.draw,
            Outcome::AwayWin => self.away_win,
        }
    }

    fn rounded(self) -> Self {
        Self {
            home_win: round_to(self.home_win, 3),
            draw: round_to(self.draw, 3),
            away_win: round_to(self.away_win, 3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalsForecast {
    pub expected_home_goals: f64,
    pub expected_away_goals: f64,
    pub goals_diff: f64,
    pub outcome: Outcome,
    /// Percent, rounded to 0.1.
    pub confidence: f64,
    pub probabilities: Probabilities,
}

pub fn resolve(strengths: &Matchup, model: ProbabilityModel) -> GoalsForecast {
    let home_attack_index = strengths.home.attack / HOME_BASE;
    let away_attack_index = strengths.away.attack / HOME_BASE;

    let home_defense_index = clamp(
        DEFENSE_PIVOT / strengths.away.defense,
        DEFENSE_INDEX.0,
        DEFENSE_INDEX.1,
    );
    let away_defense_index = clamp(
        DEFENSE_PIVOT / strengths.home.defense,
        DEFENSE_INDEX.0,
        DEFENSE_INDEX.1,
    );

    let expected_home_goals = clamp(
        HOME_BASE * home_attack_index * home_defense_index,
        EXPECTED_GOALS.0,
        EXPECTED_GOALS.1,
    );
    let expected_away_goals = clamp(
        AWAY_BASE * away_attack_index * away_defense_index,
        EXPECTED_GOALS.0,
        EXPECTED_GOALS.1,
    );

    let goals_diff = expected_home_goals - expected_away_goals;
    let (outcome, confidence) = decide(goals_diff);
    let probabilities = match model {
        ProbabilityModel::Banded => banded_probabilities(goals_diff),
        ProbabilityModel::Softmax => softmax_probabilities(goals_diff),
    };

    GoalsForecast {
        expected_home_goals,
        expected_away_goals,
        goals_diff,
        outcome,
        confidence: round_to(confidence, 1),
        probabilities: probabilities.rounded(),
    }
}

/// Fixed decision thresholds on the expected-goals difference.
pub fn decide(goals_diff: f64) -> (Outcome, f64) {
    let margin = goals_diff.abs();
    if goals_diff >= WIN_MARGIN {
        (Outcome::HomeWin, (65.0 + margin * 25.0).min(95.0))
    } else if goals_diff <= -WIN_MARGIN {
        (Outcome::AwayWin, (65.0 + margin * 25.0).min(95.0))
    } else if margin <= DRAW_MARGIN {
        (Outcome::Draw, 60.0 + (DRAW_MARGIN - margin) * 100.0)
    } else {
        // Between the draw and win margins: a narrow win for the leading side.
        let outcome = if goals_diff > 0.0 {
            Outcome::HomeWin
        } else {
            Outcome::AwayWin
        };
        (outcome, 55.0 + margin * 25.0)
    }
}

/// Each probability is reported only inside its own decision band.
///
/// In the narrow-win zone every field is zero.
pub fn banded_probabilities(goals_diff: f64) -> Probabilities {
    Probabilities {
        home_win: if goals_diff >= WIN_MARGIN {
            sigmoid(goals_diff * 2.0)
        } else {
            0.0
        },
        draw: if goals_diff.abs() <= DRAW_MARGIN {
            1.0 - goals_diff.abs() / WIN_MARGIN
        } else {
            0.0
        },
        away_win: if goals_diff <= -WIN_MARGIN {
            sigmoid(-goals_diff * 2.0)
        } else {
            0.0
        },
    }
}

/// Three-way softmax whose argmax agrees with [`decide`].
///
/// Win logits are `±2·diff`; the draw logit `0.8 - 2·|diff|` meets the
/// leading side's logit exactly at the draw margin.
pub fn softmax_probabilities(goals_diff: f64) -> Probabilities {
    let home = 2.0 * goals_diff;
    let away = -2.0 * goals_diff;
    let draw = 2.0 * (2.0 * DRAW_MARGIN) - 2.0 * goals_diff.abs();

    let top = home.max(away).max(draw);
    let (eh, ed, ea) = ((home - top).exp(), (draw - top).exp(), (away - top).exp());
    let sum = eh + ed + ea;
    Probabilities {
        home_win: eh / sum,
        draw: ed / sum,
        away_win: ea / sum,
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
