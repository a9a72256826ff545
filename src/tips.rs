use std::fmt;

use serde::{Deserialize, Serialize};

use crate::markets::BttsLabel;
use crate::model::{Side, SidePair};

/// One ranked betting recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BettingTip {
    /// Match result, e.g. "Победа Arsenal" or "Ничья".
    Result { label: String },
    Total { over: bool, line: f64 },
    BothTeamsScore,
    TeamTotal { side: Side, team: String, line: f64 },
}

impl BettingTip {
    /// Settles an over/under tip against the final score.
    ///
    /// `None` for a push or for tips that are not totals.
    pub fn settle_total(&self, actual_goals: u32) -> Option<bool> {
        let BettingTip::Total { over, line } = self else {
            return None;
        };
        let actual = f64::from(actual_goals);
        if actual == *line {
            return None;
        }
        Some((actual > *line) == *over)
    }
}

impl fmt::Display for BettingTip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BettingTip::Result { label } => write!(f, "✅ {label}"),
            BettingTip::Total { over: true, line } => write!(f, "✅ Тотал больше {line}"),
            BettingTip::Total { over: false, line } => write!(f, "✅ Тотал меньше {line}"),
            BettingTip::BothTeamsScore => write!(f, "✅ Обе команды забьют"),
            BettingTip::TeamTotal {
                side: Side::Home,
                team,
                line,
            } => write!(f, "✅ ИТ {team} больше {line}"),
            BettingTip::TeamTotal {
                side: Side::Away,
                line,
                ..
            } => write!(f, "✅ ИТ гостей больше {line}"),
        }
    }
}

/// Result pick, total pick, then BTTS or the stronger side's team total.
pub fn betting_tips(
    result_label: &str,
    total_goals: f64,
    btts: BttsLabel,
    team_totals: SidePair<f64>,
    teams: SidePair<&str>,
) -> Vec<BettingTip> {
    let mut tips = vec![
        BettingTip::Result {
            label: result_label.to_string(),
        },
        total_tip(total_goals),
    ];

    if btts.leans_yes() {
        tips.push(BettingTip::BothTeamsScore);
    } else {
        let (side, total, team) = if team_totals.home > team_totals.away {
            (Side::Home, team_totals.home, teams.home)
        } else {
            (Side::Away, team_totals.away, teams.away)
        };
        let line = if total >= 2.0 {
            1.5
        } else if total >= 1.5 {
            1.0
        } else {
            0.5
        };
        tips.push(BettingTip::TeamTotal {
            side,
            team: team.to_string(),
            line,
        });
    }
    tips
}

fn total_tip(total_goals: f64) -> BettingTip {
    let (over, line) = if total_goals >= 3.2 {
        (true, 3.5)
    } else if total_goals >= 2.7 {
        (true, 2.5)
    } else if total_goals >= 2.2 {
        (true, 2.0)
    } else if total_goals >= 1.7 {
        (false, 2.5)
    } else if total_goals >= 1.2 {
        (false, 2.0)
    } else {
        (false, 1.5)
    };
    BettingTip::Total { over, line }
}
